//! Scriptable in-memory `AudioBackend`.
//!
//! Used by the engine tests and by hosts without an output device. Time only
//! moves when the probe advances it, so tests stay deterministic.

use std::sync::{Arc, Mutex};

use crate::state::lock;

use super::backend::AudioBackend;
use super::types::{AudioError, GraphState};

#[derive(Debug, Clone, Default)]
pub struct FakeOptions {
    /// `create_element` fails (no audio support at all).
    pub fail_element: bool,
    /// `construct` fails (analysis unsupported).
    pub fail_construct: bool,
    /// `play` is rejected (autoplay policy).
    pub reject_play: bool,
    /// Seeks beyond this position land here instead.
    pub seek_limit: Option<f64>,
    /// Spectrum reported while the graph runs.
    pub spectrum: Option<Vec<u8>>,
    /// Length reported for every source.
    pub track_duration: f64,
}

/// Everything a test may want to observe about the fake.
#[derive(Debug, Clone, Default)]
pub struct FakeAudio {
    pub calls: Vec<String>,
    pub element: bool,
    pub source: Option<String>,
    pub sources: Vec<String>,
    pub playing: bool,
    pub position: f64,
    pub volume: f32,
    pub graph: GraphState,
    pub connections: usize,
    pub ended: bool,
    pub released: bool,
}

pub struct FakeBackend {
    options: FakeOptions,
    shared: Arc<Mutex<FakeAudio>>,
}

/// Test-side view of a [`FakeBackend`].
#[derive(Clone)]
pub struct FakeProbe {
    shared: Arc<Mutex<FakeAudio>>,
}

impl FakeBackend {
    pub fn new(options: FakeOptions) -> (Self, FakeProbe) {
        let shared = Arc::new(Mutex::new(FakeAudio::default()));
        let probe = FakeProbe {
            shared: shared.clone(),
        };
        (Self { options, shared }, probe)
    }

    fn record(&self, call: &str) -> std::sync::MutexGuard<'_, FakeAudio> {
        let mut audio = lock(&self.shared);
        audio.calls.push(call.to_string());
        audio
    }
}

impl FakeProbe {
    pub fn snapshot(&self) -> FakeAudio {
        lock(&self.shared).clone()
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.shared).calls.clone()
    }

    /// How many times `call` was made.
    pub fn count(&self, call: &str) -> usize {
        lock(&self.shared).calls.iter().filter(|c| *c == call).count()
    }

    /// Let time pass on the playing source.
    pub fn advance(&self, secs: f64) {
        let mut audio = lock(&self.shared);
        if audio.playing {
            audio.position += secs;
        }
    }

    /// Make the current source run out.
    pub fn finish_track(&self) {
        let mut audio = lock(&self.shared);
        audio.playing = false;
        audio.ended = true;
    }
}

impl AudioBackend for FakeBackend {
    fn create_element(&mut self, volume: f32) -> Result<(), AudioError> {
        let mut audio = self.record("create_element");
        if self.options.fail_element {
            return Err(AudioError::DeviceUnavailable("fake".into()));
        }
        audio.element = true;
        audio.volume = volume;
        Ok(())
    }

    fn set_source(&mut self, src: &str) -> Result<(), AudioError> {
        let mut audio = self.record("set_source");
        audio.source = Some(src.to_string());
        audio.sources.push(src.to_string());
        audio.position = 0.0;
        audio.playing = false;
        audio.ended = false;
        Ok(())
    }

    fn construct(&mut self) -> Result<(), AudioError> {
        let mut audio = self.record("construct");
        if self.options.fail_construct {
            return Err(AudioError::GraphUnsupported("fake".into()));
        }
        audio.graph = GraphState::Suspended;
        Ok(())
    }

    fn connect(&mut self) -> Result<(), AudioError> {
        let mut audio = self.record("connect");
        if audio.connections > 0 {
            return Err(AudioError::Rejected("already connected".into()));
        }
        audio.connections += 1;
        Ok(())
    }

    fn graph_state(&self) -> GraphState {
        lock(&self.shared).graph
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let mut audio = self.record("resume");
        audio.graph = GraphState::Running;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut audio = self.record("play");
        if self.options.reject_play {
            return Err(AudioError::Rejected("autoplay".into()));
        }
        audio.playing = audio.source.is_some();
        Ok(())
    }

    fn pause(&mut self) {
        self.record("pause").playing = false;
    }

    fn seek(&mut self, secs: f64) -> f64 {
        let mut audio = self.record("seek");
        let landed = match self.options.seek_limit {
            Some(limit) => secs.min(limit),
            None => secs,
        };
        audio.position = landed;
        audio.ended = false;
        landed
    }

    fn set_volume(&mut self, volume: f32) {
        self.record("set_volume").volume = volume;
    }

    fn position(&self) -> f64 {
        lock(&self.shared).position
    }

    fn duration(&self) -> f64 {
        if lock(&self.shared).source.is_some() {
            self.options.track_duration
        } else {
            0.0
        }
    }

    fn take_ended(&mut self) -> bool {
        std::mem::take(&mut lock(&self.shared).ended)
    }

    fn spectrum(&mut self, out: &mut [u8]) -> bool {
        let Some(data) = self.options.spectrum.as_ref() else {
            return false;
        };
        out.fill(0);
        for (slot, value) in out.iter_mut().zip(data) {
            *slot = *value;
        }
        true
    }

    fn release(&mut self) {
        let mut audio = self.record("release");
        audio.element = false;
        audio.playing = false;
        audio.graph = GraphState::Unavailable;
        audio.released = true;
    }
}
