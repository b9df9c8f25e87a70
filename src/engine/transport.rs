use crate::library::Track;
use crate::state::{RepeatMode, lock};

use super::handle::Engine;

impl Engine {
    /// Flip between playing and paused. Returns the new `is_playing`.
    ///
    /// The first call creates the audio graph. A suspended context is resumed
    /// and the element is connected before playback starts. A rejected play
    /// is logged; `is_playing` flips regardless.
    pub fn toggle_play(&self) -> bool {
        self.init_audio();

        let playing = {
            let mut graph = lock(&self.inner.graph);
            graph.resume_if_suspended();
            graph.connect();

            let playing = {
                let mut s = lock(&self.inner.state);
                s.is_playing = !s.is_playing;
                s.is_playing
            };
            if playing {
                graph.play();
            } else {
                graph.pause();
            }
            playing
        };

        if playing {
            self.start_loop();
        } else {
            self.stop_loop();
        }
        log::debug!("playing: {playing}");
        playing
    }

    /// Clamp `volume` into `[0, 100]`, derive the mute flag and mirror it onto the element.
    pub fn set_volume(&self, volume: i32) -> u8 {
        let mut graph = lock(&self.inner.graph);
        let volume = lock(&self.inner.state).set_volume(volume);
        graph.set_volume(volume);
        volume
    }

    /// Move to `time` seconds. Returns the position the element reports.
    ///
    /// Negative or non-finite times seek to 0. When the element lands somewhere
    /// else (unbuffered range, unseekable stream) a warning is logged.
    pub fn seek(&self, time: f64) -> f64 {
        let target = if time.is_finite() { time.max(0.0) } else { 0.0 };
        self.init_audio();

        let mut graph = lock(&self.inner.graph);
        let landed = graph.seek(target);
        if let Some(landed) = landed {
            if (landed - target).abs() > self.inner.settings.audio.seek_tolerance_secs {
                log::warn!("seek to {target:.2}s might be clamped by buffered range (at {landed:.2}s)");
            }
        }
        lock(&self.inner.state).current_time = target;
        landed.unwrap_or(target)
    }

    /// Returns the new repeat mode.
    pub fn toggle_repeat(&self) -> RepeatMode {
        let mode = lock(&self.inner.state).cycle_repeat();
        log::info!("repeat mode: {mode:?}");
        mode
    }

    /// Returns whether `id` is now a favorite.
    pub fn toggle_favorite(&self, id: &str) -> bool {
        lock(&self.inner.state).toggle_favorite(id)
    }

    /// Replace the track list and point the element at its first track.
    pub fn set_playlist(&self, tracks: Vec<Track>) {
        let mut graph = lock(&self.inner.graph);
        let first = {
            let mut s = lock(&self.inner.state);
            s.set_playlist(tracks);
            s.current_track().map(|t| t.src.clone())
        };
        if let Some(src) = first {
            graph.bind(&src);
        }
    }

    /// Append tracks to the list.
    pub fn add_tracks(&self, tracks: Vec<Track>) {
        lock(&self.inner.state).add_tracks(tracks);
    }
}
