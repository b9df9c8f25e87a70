//! Per-frame spectral features: band intensities, beat pulse and the
//! synthesized spectrum used when no real analysis is available.

mod bands;
mod beat;
mod frame;
mod generator;

pub use bands::band_mean;
pub use beat::BeatDetector;
pub use frame::{Frame, SpectralLoop};
pub use generator::{PseudoNoise, SignalGenerator};
