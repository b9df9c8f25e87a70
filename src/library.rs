//! Track model and the mapping from the wire shape used by the track index.

mod media;
mod model;

pub use media::{resolve_media_url, track_from_raw};
pub use model::{RawId, RawTrack, Track};

#[cfg(test)]
mod tests;
