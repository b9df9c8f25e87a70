use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::library::{Track, track_from_raw};
use crate::state::{StateHandle, lock};

use super::source::{PageRequest, TrackSource};

/// Shared flag flipped once when the owner of in-flight work goes away.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Another fetch was in flight or the list is exhausted; nothing was requested.
    Skipped,
    /// A page was appended.
    Loaded { added: usize, exhausted: bool },
    /// The request failed; `has_more` is untouched so a later call can retry.
    Failed,
    /// The owner was disposed while the request was in flight.
    Discarded,
}

/// Grows the track list one page at a time.
///
/// At most one request is in flight: `is_loading_more` is tested and set under
/// the state lock, and the lock is released for the duration of the request.
pub struct PlaylistLoader {
    source: Arc<dyn TrackSource>,
    state: StateHandle,
    page_size: usize,
    media_base: String,
    token: CancelToken,
}

impl PlaylistLoader {
    pub fn new(
        source: Arc<dyn TrackSource>,
        state: StateHandle,
        page_size: usize,
        media_base: impl Into<String>,
        token: CancelToken,
    ) -> Self {
        Self {
            source,
            state,
            page_size: page_size.max(1),
            media_base: media_base.into(),
            token,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetch and append the next page. Never fails; see `LoadOutcome`.
    pub fn load_more(&self) -> LoadOutcome {
        let offset = {
            let mut s = lock(&self.state);
            if s.is_loading_more || !s.has_more || self.token.is_cancelled() {
                return LoadOutcome::Skipped;
            }
            s.is_loading_more = true;
            s.cursor
        };

        let request = PageRequest {
            offset,
            limit: self.page_size,
        };
        log::debug!("requesting tracks offset={} limit={}", request.offset, request.limit);
        let result = self.source.fetch_page(&request);

        let mut s = lock(&self.state);
        s.is_loading_more = false;

        if self.token.is_cancelled() {
            log::debug!("dropping page at offset {offset}: engine disposed");
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let added = page.results.len();
                let tracks: Vec<Track> = page
                    .results
                    .into_iter()
                    .map(|raw| track_from_raw(raw, &self.media_base))
                    .collect();
                s.add_tracks(tracks);
                s.cursor = page.next_offset.unwrap_or(offset + added);
                s.pages_loaded += 1;

                let exhausted = added < self.page_size;
                if exhausted {
                    s.has_more = false;
                }
                log::info!(
                    "loaded {added} tracks (list now {}, more: {})",
                    s.track_list.len(),
                    s.has_more
                );
                LoadOutcome::Loaded { added, exhausted }
            }
            Err(e) => {
                log::error!("error loading more tracks at offset {offset}: {e}");
                LoadOutcome::Failed
            }
        }
    }
}
