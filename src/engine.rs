//! The engine object: owns the playback state, the audio graph, the spectral
//! loop and the playlist loader, and exposes the transport surface.
//!
//! Lock order is graph, then spectral loop, then state. No lock is held across
//! a page request or across a call back into the engine.

mod frames;
mod handle;
mod navigation;
mod transport;

pub use frames::{FrameClock, LoopControl};
pub use handle::Engine;
pub use navigation::Advance;
