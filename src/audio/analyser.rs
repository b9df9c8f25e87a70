//! Byte-valued frequency analysis over the most recent block of samples.
//!
//! Mirrors what a browser analyser node reports: Blackman window, forward FFT,
//! magnitudes normalized by the window length, temporal smoothing, then a
//! linear mapping of the dB value between `min_db` and `max_db` onto 0..=255.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::AnalysisSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserConfig {
    pub fft_size: usize,
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
}

impl From<&AnalysisSettings> for AnalyserConfig {
    fn from(s: &AnalysisSettings) -> Self {
        Self {
            fft_size: s.fft_size,
            smoothing: s.smoothing,
            min_db: s.min_db,
            max_db: s.max_db,
        }
    }
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self::from(&AnalysisSettings::default())
    }
}

pub struct FrequencyAnalyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new(config: AnalyserConfig) -> Self {
        let n = config.fft_size.max(2);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n);

        let window = (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            })
            .collect();

        Self {
            config: AnalyserConfig {
                fft_size: n,
                ..config
            },
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; n / 2],
        }
    }

    pub fn bins(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Analyse `samples` (oldest first) into `out`.
    ///
    /// Only the last `fft_size` samples are used; shorter input is treated as
    /// preceded by silence. `out` is filled up to `min(out.len(), bins)`.
    pub fn byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        let n = self.config.fft_size;
        let recent = &samples[samples.len().saturating_sub(n)..];
        let pad = n - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing;
        let range = self.config.max_db - self.config.min_db;
        for (k, byte) in out.iter_mut().take(self.bins()).enumerate() {
            let magnitude = self.buffer[k].norm() / n as f32;
            let smoothed = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            self.smoothed[k] = if smoothed.is_finite() { smoothed } else { 0.0 };

            let db = 20.0 * self.smoothed[k].log10();
            let scaled = 255.0 * (db - self.config.min_db) / range;
            *byte = if scaled.is_finite() {
                scaled.clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }
}
