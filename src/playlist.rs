//! Paged loading of the track list.
//!
//! `source` defines the fetch contract (`TrackSource`) and its HTTP
//! implementation; `loader` appends pages to the shared state while keeping a
//! single request in flight.

mod loader;
mod source;

pub use loader::{CancelToken, LoadOutcome, PlaylistLoader};
pub use source::{FetchError, HttpTrackSource, PageBody, PageRequest, PageResponse, TrackSource};

#[cfg(test)]
mod tests;
