use crate::mpris::{MprisHandle, PlayerStatus};
use crate::state::{PlaybackState, RepeatMode};

/// The slice of engine state mirrored onto MPRIS.
#[derive(Debug, Clone, PartialEq)]
pub struct MprisView {
    pub index: Option<usize>,
    pub track_id: Option<String>,
    pub status: PlayerStatus,
    pub repeat: RepeatMode,
    pub volume: u8,
    pub duration: f64,
}

pub fn player_status(state: &PlaybackState) -> PlayerStatus {
    if state.current_track().is_none() {
        PlayerStatus::Stopped
    } else if state.is_playing {
        PlayerStatus::Playing
    } else {
        PlayerStatus::Paused
    }
}

impl MprisView {
    pub fn of(state: &PlaybackState) -> Self {
        let track = state.current_track();
        Self {
            index: track.map(|_| state.current_track_index),
            track_id: track.map(|t| t.id.clone()),
            status: player_status(state),
            repeat: state.repeat_mode,
            volume: state.volume,
            duration: state.duration,
        }
    }
}

/// Push `state` to MPRIS when it differs from what was last published.
pub fn update_mpris(mpris: &MprisHandle, state: &PlaybackState, last: &mut Option<MprisView>) {
    let view = MprisView::of(state);
    if last.as_ref() == Some(&view) {
        return;
    }

    let track_changed = last
        .as_ref()
        .is_none_or(|l| l.track_id != view.track_id || l.duration != view.duration);
    if track_changed {
        mpris.set_track_metadata(view.index, state.current_track(), view.duration);
    }
    mpris.set_playback(view.status);
    mpris.set_loop(view.repeat);
    mpris.set_volume(view.volume);
    *last = Some(view);
}
