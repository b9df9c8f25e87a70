use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::state::lock;

use super::analyser::{AnalyserConfig, FrequencyAnalyser};
use super::backend::AudioBackend;
use super::tap::SampleTap;
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, AudioError, GraphState, PlaybackHandle, PlaybackInfo};

const DEVICE_TIMEOUT: Duration = Duration::from_secs(5);
const SEEK_TIMEOUT: Duration = Duration::from_secs(2);

/// `AudioBackend` backed by a `rodio` output stream on its own thread.
///
/// The analysis node is an FFT over the samples the current sink played most
/// recently, captured by a [`SampleTap`].
pub struct RodioBackend {
    config: AnalyserConfig,
    tx: Option<Sender<AudioCmd>>,
    join: Option<JoinHandle<()>>,
    playback: PlaybackHandle,
    tap: SampleTap,
    analyser: Option<FrequencyAnalyser>,
    state: GraphState,
    samples: Vec<f32>,
}

impl RodioBackend {
    pub fn new(config: AnalyserConfig) -> Self {
        Self {
            config,
            tx: None,
            join: None,
            playback: Arc::new(Mutex::new(PlaybackInfo::default())),
            tap: SampleTap::new(config.fft_size * 4),
            analyser: None,
            state: GraphState::Unavailable,
            samples: Vec::with_capacity(config.fft_size * 4),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), AudioError> {
        let tx = self.tx.as_ref().ok_or(AudioError::NoElement)?;
        tx.send(cmd).map_err(|_| AudioError::ThreadGone)
    }
}

impl AudioBackend for RodioBackend {
    fn create_element(&mut self, volume: f32) -> Result<(), AudioError> {
        if self.tx.is_some() {
            return Ok(());
        }
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = spawn_audio_thread(rx, self.playback.clone(), self.tap.clone(), ready_tx);

        match ready_rx.recv_timeout(DEVICE_TIMEOUT) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => return Err(AudioError::DeviceUnavailable("timed out".into())),
        }

        self.tx = Some(tx);
        self.join = Some(handle);
        self.send(AudioCmd::SetVolume(volume))
    }

    fn set_source(&mut self, src: &str) -> Result<(), AudioError> {
        self.send(AudioCmd::Load(src.to_string()))
    }

    fn construct(&mut self) -> Result<(), AudioError> {
        if self.tx.is_none() {
            return Err(AudioError::NoElement);
        }
        if !self.config.fft_size.is_power_of_two() {
            return Err(AudioError::GraphUnsupported(format!(
                "fft size {} is not a power of two",
                self.config.fft_size
            )));
        }
        self.analyser = Some(FrequencyAnalyser::new(self.config));
        self.state = GraphState::Suspended;
        Ok(())
    }

    fn connect(&mut self) -> Result<(), AudioError> {
        if self.analyser.is_none() {
            return Err(AudioError::GraphUnsupported("no analysis node".into()));
        }
        if self.tap.is_enabled() {
            return Err(AudioError::Rejected("element is already connected".into()));
        }
        self.tap.set_enabled(true);
        Ok(())
    }

    fn graph_state(&self) -> GraphState {
        self.state
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.analyser.is_none() {
            return Err(AudioError::GraphUnsupported("no processing context".into()));
        }
        self.state = GraphState::Running;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.send(AudioCmd::Play)
    }

    fn pause(&mut self) {
        let _ = self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, secs: f64) -> f64 {
        let (reply, landed) = mpsc::channel();
        let to = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or_default();
        if self.send(AudioCmd::Seek { to, reply }).is_err() {
            return self.position();
        }
        match landed.recv_timeout(SEEK_TIMEOUT) {
            Ok(pos) => pos.as_secs_f64(),
            Err(_) => self.position(),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.send(AudioCmd::SetVolume(volume));
    }

    fn position(&self) -> f64 {
        lock(&self.playback).position.as_secs_f64()
    }

    fn duration(&self) -> f64 {
        lock(&self.playback)
            .duration
            .map_or(0.0, |d| d.as_secs_f64())
    }

    fn take_ended(&mut self) -> bool {
        std::mem::take(&mut lock(&self.playback).ended)
    }

    fn spectrum(&mut self, out: &mut [u8]) -> bool {
        if self.state != GraphState::Running || !self.tap.is_enabled() {
            return false;
        }
        let Some(analyser) = self.analyser.as_mut() else {
            return false;
        };
        self.tap.snapshot(&mut self.samples);
        analyser.byte_frequency_data(&self.samples, out);
        true
    }

    fn release(&mut self) {
        let _ = self.send(AudioCmd::Quit);
        self.tx = None;
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
        self.tap.set_enabled(false);
        self.tap.clear();
        self.analyser = None;
        self.state = GraphState::Unavailable;
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.release();
    }
}
