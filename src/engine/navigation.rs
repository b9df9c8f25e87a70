use crate::audio::AudioGraph;
use crate::playlist::LoadOutcome;
use crate::state::{RepeatMode, lock};

use super::handle::Engine;

/// What a navigation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing to do: an exhausted empty list, or the end of the list with repeat off.
    Idle,
    /// The current track went back to 0.
    Restarted,
    /// Moved to this index.
    Moved(usize),
    /// Wrapped from the end of the list to its start.
    Wrapped,
    /// At the end of the known list; a page load is running in the background.
    Loading,
}

impl Engine {
    /// Go to the next track, honouring the repeat mode.
    ///
    /// At the end of the known list, while the server may have more, the next
    /// page is loaded in the background. When it brings new tracks playback
    /// moves on to the first of them; otherwise the repeat mode decides. An
    /// empty list counts as its own end, so a failed first load is retried.
    pub fn next_track(&self) -> Advance {
        let mut graph = lock(&self.inner.graph);
        let (len, index, mode, has_more) = {
            let s = lock(&self.inner.state);
            (
                s.track_list.len(),
                s.current_track_index,
                s.repeat_mode,
                s.has_more,
            )
        };

        if len == 0 {
            if has_more && !self.is_disposed() {
                drop(graph);
                self.spawn_pending(move |engine| engine.finish_tail_load(index, 0));
                return Advance::Loading;
            }
            return Advance::Idle;
        }
        if mode == RepeatMode::One {
            self.restart_locked(&mut graph, true);
            return Advance::Restarted;
        }
        if index + 1 < len {
            self.change_track_locked(&mut graph, index + 1);
            return Advance::Moved(index + 1);
        }

        if has_more && !self.is_disposed() {
            drop(graph);
            self.spawn_pending(move |engine| engine.finish_tail_load(index, len));
            return Advance::Loading;
        }
        self.wrap_or_stop_locked(&mut graph, mode)
    }

    /// Restart the current track once it played past the restart threshold,
    /// otherwise go to the previous track (wrapping to the end).
    pub fn prev_track(&self) -> Advance {
        let mut graph = lock(&self.inner.graph);
        let (len, index, state_time) = {
            let s = lock(&self.inner.state);
            (s.track_list.len(), s.current_track_index, s.current_time)
        };
        if len == 0 {
            return Advance::Idle;
        }

        let elapsed = graph.position().unwrap_or(state_time);
        if elapsed > self.inner.settings.audio.restart_threshold_secs {
            self.restart_locked(&mut graph, false);
            return Advance::Restarted;
        }

        let prev = (index + len - 1) % len;
        self.change_track_locked(&mut graph, prev);
        Advance::Moved(prev)
    }

    /// Continuation of a load started at `tail` while the list held `len_before` tracks.
    fn finish_tail_load(&self, tail: usize, len_before: usize) {
        let outcome = self.load_more_tracks();
        if outcome == LoadOutcome::Discarded || self.is_disposed() {
            return;
        }

        let mut graph = lock(&self.inner.graph);
        let (len, index, mode, in_flight) = {
            let s = lock(&self.inner.state);
            (
                s.track_list.len(),
                s.current_track_index,
                s.repeat_mode,
                s.is_loading_more,
            )
        };
        if outcome == LoadOutcome::Skipped && in_flight {
            // The running load advances when it lands.
            log::debug!("page load already running, leaving navigation to it");
            return;
        }
        if index != tail {
            log::debug!("navigation moved on while loading, not advancing");
            return;
        }
        if len > len_before {
            self.change_track_locked(&mut graph, len_before);
        } else {
            self.wrap_or_stop_locked(&mut graph, mode);
        }
    }

    fn wrap_or_stop_locked(&self, graph: &mut AudioGraph, mode: RepeatMode) -> Advance {
        if mode == RepeatMode::All {
            self.change_track_locked(graph, 0);
            Advance::Wrapped
        } else {
            log::debug!("end of playlist");
            Advance::Idle
        }
    }

    /// Rewind the current track; with `resume`, keep it playing if the engine is.
    fn restart_locked(&self, graph: &mut AudioGraph, resume: bool) {
        let playing = {
            let mut s = lock(&self.inner.state);
            s.current_time = 0.0;
            s.is_playing
        };
        graph.restart(resume && playing);
    }

    fn change_track_locked(&self, graph: &mut AudioGraph, index: usize) {
        let (src, playing) = {
            let mut s = lock(&self.inner.state);
            let Some(src) = s.track_list.get(index).map(|t| t.src.clone()) else {
                return;
            };
            s.current_track_index = index;
            s.current_time = 0.0;
            s.duration = 0.0;
            (src, s.is_playing)
        };
        log::debug!("changing to track {index}");
        graph.bind(&src);
        if playing {
            graph.play();
        }
    }
}
