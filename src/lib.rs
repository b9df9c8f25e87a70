//! Audio-reactive playback engine: transport state for a streamed track list,
//! real-time spectral features of the playing audio (with a synthesized
//! fallback), and incremental loading of the track list from a paged endpoint.

pub mod audio;
pub mod config;
pub mod engine;
pub mod library;
pub mod mpris;
pub mod playlist;
pub mod runtime;
pub mod spectrum;
pub mod state;

pub use engine::{Advance, Engine, FrameClock, LoopControl};
