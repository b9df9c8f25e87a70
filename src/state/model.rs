//! Playback state types: `PlaybackState` and `RepeatMode`.
//!
//! `PlaybackState` is the canonical record of transport status, the known
//! track list and the per-frame spectral values. It only holds data and small
//! mutators; anything touching audio or the network lives in the engine.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop at the end of the known list.
    #[default]
    Off,
    /// Wrap around to the start of the list.
    All,
    /// Restart the current track when it ends.
    One,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

pub type StateHandle = Arc<Mutex<PlaybackState>>;

#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_muted: bool,
    pub volume: u8,
    pub current_time: f64,
    pub duration: f64,

    pub track_list: Vec<Track>,
    pub current_track_index: usize,
    pub repeat_mode: RepeatMode,
    pub favorites: HashSet<String>,

    frequency_data: Vec<u8>,
    pub bass_intensity: f32,
    pub mid_intensity: f32,
    pub beat_detected: bool,

    pub has_more: bool,
    pub is_loading_more: bool,
    /// Offset of the next page to request.
    pub cursor: usize,
    pub pages_loaded: usize,
}

impl PlaybackState {
    /// Create an empty state whose spectrum holds `bins` values for its whole lifetime.
    pub fn new(bins: usize, volume: u8, repeat_mode: RepeatMode) -> Self {
        let volume = volume.min(100);
        Self {
            is_playing: false,
            is_muted: volume == 0,
            volume,
            current_time: 0.0,
            duration: 0.0,
            track_list: Vec::new(),
            current_track_index: 0,
            repeat_mode,
            favorites: HashSet::new(),
            frequency_data: vec![0; bins],
            bass_intensity: 0.0,
            mid_intensity: 0.0,
            beat_detected: false,
            has_more: true,
            is_loading_more: false,
            cursor: 0,
            pages_loaded: 0,
        }
    }

    pub fn into_handle(self) -> StateHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn analysis_bins(&self) -> usize {
        self.frequency_data.len()
    }

    pub fn frequency_data(&self) -> &[u8] {
        &self.frequency_data
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.track_list.get(self.current_track_index)
    }

    pub fn is_at_tail(&self) -> bool {
        !self.track_list.is_empty() && self.current_track_index + 1 == self.track_list.len()
    }

    /// Clamp `v` into `[0, 100]`, store it and derive the mute flag.
    pub fn set_volume(&mut self, v: i32) -> u8 {
        self.volume = v.clamp(0, 100) as u8;
        self.is_muted = self.volume == 0;
        self.volume
    }

    /// Add or remove `id` from the favorites. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        if self.favorites.remove(id) {
            false
        } else {
            self.favorites.insert(id.to_string());
            true
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.next();
        self.repeat_mode
    }

    /// Replace the list and rewind to its first track.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.cursor = tracks.len();
        self.track_list = tracks;
        self.current_track_index = 0;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    /// Append tracks without touching the pagination cursor.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) {
        self.track_list.extend(tracks);
    }

    /// Publish one analysis frame. `data` is copied into the fixed-size
    /// spectrum; missing bins read as zero and extra bins are dropped.
    pub fn write_frame(&mut self, data: &[u8], bass: f32, mid: f32, beat: bool) {
        let n = data.len().min(self.frequency_data.len());
        self.frequency_data[..n].copy_from_slice(&data[..n]);
        self.frequency_data[n..].fill(0);
        self.bass_intensity = bass.clamp(0.0, 1.0);
        self.mid_intensity = mid.clamp(0.0, 1.0);
        self.beat_detected = beat;
    }

    /// Put the spectral outputs at rest.
    pub fn silence(&mut self) {
        self.frequency_data.fill(0);
        self.bass_intensity = 0.0;
        self.mid_intensity = 0.0;
        self.beat_detected = false;
    }
}
