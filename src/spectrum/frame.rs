use std::ops::Range;
use std::time::{Duration, Instant};

use crate::config::AnalysisSettings;

use super::bands::band_mean;
use super::beat::BeatDetector;
use super::generator::SignalGenerator;

/// Derived values of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub bass: f32,
    pub mid: f32,
    pub beat: bool,
}

/// One step of the spectral loop, minus scheduling and state writes.
pub struct SpectralLoop {
    generator: Box<dyn SignalGenerator>,
    beat: BeatDetector,
    bass_bins: Range<usize>,
    mid_bins: Range<usize>,
    buffer: Vec<u8>,
}

impl SpectralLoop {
    pub fn new(settings: &AnalysisSettings, generator: Box<dyn SignalGenerator>) -> Self {
        Self {
            generator,
            beat: BeatDetector::new(
                settings.beat_threshold,
                Duration::from_millis(settings.beat_refractory_ms),
            ),
            bass_bins: settings.bass_bins[0]..settings.bass_bins[1],
            mid_bins: settings.mid_bins[0]..settings.mid_bins[1],
            buffer: vec![0; settings.bins()],
        }
    }

    /// Scratch buffer a real analyser writes into before [`Self::step`].
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Produce a frame. Unless `real` is set the buffer is synthesized first.
    pub fn step(&mut self, now: Instant, t_ms: f64, real: bool) -> Frame {
        self.beat.expire(now);
        if !real {
            self.generator.fill(t_ms, &mut self.buffer);
        }

        let bass_avg = band_mean(&self.buffer, self.bass_bins.clone());
        let mid_avg = band_mean(&self.buffer, self.mid_bins.clone());
        Frame {
            bass: bass_avg / 255.0,
            mid: mid_avg / 255.0,
            beat: self.beat.observe(now, bass_avg),
        }
    }

    /// Forget the beat and zero the buffer.
    pub fn reset(&mut self) {
        self.beat.reset();
        self.buffer.fill(0);
    }
}
