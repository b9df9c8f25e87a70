//! Owner of the playback element and the analysis graph.
//!
//! Every backend failure is logged here and absorbed: the element and the
//! analysis graph are both optional, and the rest of the engine keeps working
//! (with a synthesized spectrum) when either is missing.

use super::backend::AudioBackend;
use super::types::GraphState;

/// Position/length/ended snapshot taken once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUpdate {
    pub position: f64,
    pub duration: f64,
    pub ended: bool,
}

pub struct AudioGraph {
    backend: Box<dyn AudioBackend>,
    element: bool,
    graph: bool,
    connected: bool,
    released: bool,
}

impl AudioGraph {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            element: false,
            graph: false,
            connected: false,
            released: false,
        }
    }

    pub fn has_element(&self) -> bool {
        self.element
    }

    /// Whether the processing context and analysis node were built.
    pub fn has_graph(&self) -> bool {
        self.graph
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn state(&self) -> GraphState {
        if self.graph {
            self.backend.graph_state()
        } else {
            GraphState::Unavailable
        }
    }

    /// Create the element and try to build the analysis graph.
    ///
    /// Returns true only when this call created the element; an existing
    /// element is reused and a released graph is never rebuilt.
    pub fn init(&mut self, src: Option<&str>, volume: u8) -> bool {
        if self.element || self.released {
            return false;
        }

        if let Err(e) = self.backend.create_element(gain(volume)) {
            log::warn!("audio element unavailable, playback disabled: {e}");
            return false;
        }
        self.element = true;

        if let Some(src) = src {
            self.bind(src);
        }

        match self.backend.construct() {
            Ok(()) => self.graph = true,
            Err(e) => {
                log::warn!("audio analysis not supported or blocked, using synthesized spectrum: {e}");
            }
        }
        true
    }

    /// Connect element -> analysis node -> output. Only the first call does anything.
    pub fn connect(&mut self) {
        if !self.graph || self.connected {
            return;
        }
        match self.backend.connect() {
            Ok(()) => self.connected = true,
            Err(e) => log::warn!("failed to connect audio nodes: {e}"),
        }
    }

    /// Resume a context suspended by the host's playback policy.
    pub fn resume_if_suspended(&mut self) {
        if self.state() != GraphState::Suspended {
            return;
        }
        if let Err(e) = self.backend.resume() {
            log::warn!("failed to resume audio context: {e}");
        }
    }

    pub fn bind(&mut self, src: &str) {
        if !self.element {
            return;
        }
        if let Err(e) = self.backend.set_source(src) {
            log::error!("failed to load {src}: {e}");
        }
    }

    pub fn play(&mut self) {
        if !self.element {
            return;
        }
        if let Err(e) = self.backend.play() {
            log::warn!("autoplay blocked, waiting for interaction: {e}");
        }
    }

    pub fn pause(&mut self) {
        if self.element {
            self.backend.pause();
        }
    }

    /// Seek the element. Returns the landed position, or None without an element.
    pub fn seek(&mut self, secs: f64) -> Option<f64> {
        self.element.then(|| self.backend.seek(secs))
    }

    /// Rewind to 0 and optionally start playing.
    pub fn restart(&mut self, play: bool) {
        if self.seek(0.0).is_some() && play {
            self.play();
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        if self.element {
            self.backend.set_volume(gain(volume));
        }
    }

    pub fn position(&self) -> Option<f64> {
        self.element.then(|| self.backend.position())
    }

    /// Poll the element the way a host fires `timeupdate`/`ended`.
    ///
    /// The end flag is only consumed while `playing`; a paused frame leaves it
    /// for the next playing one.
    pub fn sync(&mut self, playing: bool) -> Option<TimeUpdate> {
        if !self.element {
            return None;
        }
        Some(TimeUpdate {
            position: self.backend.position(),
            duration: self.backend.duration(),
            ended: playing && self.backend.take_ended(),
        })
    }

    /// Read the real spectrum when the graph is running.
    pub fn read_spectrum(&mut self, out: &mut [u8]) -> bool {
        self.state() == GraphState::Running && self.backend.spectrum(out)
    }

    /// Release the element and graph. The graph cannot be rebuilt afterwards.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        if self.element {
            self.backend.pause();
        }
        self.backend.release();
        self.element = false;
        self.graph = false;
        self.connected = false;
        self.released = true;
    }
}

fn gain(volume: u8) -> f32 {
    f32::from(volume.min(100)) / 100.0
}
