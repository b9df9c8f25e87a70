//! Playback state shared between the engine, its frame loop and consumers.
//!
//! The `PlaybackState` model lives in `state::model`; consumers usually read
//! it through `Engine::snapshot`.

mod model;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use model::*;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
