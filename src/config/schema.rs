use serde::Deserialize;

use crate::state::RepeatMode;

/// Top-level engine settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/neuroplayer/config.toml` or `~/.config/neuroplayer/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NEUROPLAYER__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub analysis: AnalysisSettings,
    pub playlist: PlaylistSettings,
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume applied when the engine starts (0-100).
    pub initial_volume: u8,
    /// A seek that lands further than this from the requested time is reported as clamped.
    pub seek_tolerance_secs: f64,
    /// `prev` restarts the current track instead of skipping back once playback
    /// passed this many seconds.
    pub restart_threshold_secs: f64,
    /// Number of seconds to scrub when pressing the seek keys.
    pub scrub_seconds: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 50,
            seek_tolerance_secs: 0.05,
            restart_threshold_secs: 3.0,
            scrub_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// FFT window size. The spectrum exposes `fft_size / 2` bins.
    pub fft_size: usize,
    /// Temporal smoothing between analyser frames, in `[0, 1)`.
    pub smoothing: f32,
    /// Magnitudes at or below this level map to byte 0.
    pub min_db: f32,
    /// Magnitudes at or above this level map to byte 255.
    pub max_db: f32,
    /// Delay between frames of the analysis loop (milliseconds).
    pub frame_interval_ms: u64,
    /// Mean bass byte value above which a beat is flagged.
    pub beat_threshold: u8,
    /// Cooldown after a beat before another one may be flagged (milliseconds).
    pub beat_refractory_ms: u64,
    /// Half-open bin range averaged into the bass intensity.
    pub bass_bins: [usize; 2],
    /// Half-open bin range averaged into the mid intensity.
    pub mid_bins: [usize; 2],
}

impl AnalysisSettings {
    pub fn bins(&self) -> usize {
        self.fft_size / 2
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            fft_size: 128,
            smoothing: 0.85,
            min_db: -100.0,
            max_db: -30.0,
            frame_interval_ms: 16,
            beat_threshold: 200,
            beat_refractory_ms: 100,
            bass_bins: [0, 4],
            mid_bins: [5, 20],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Origin of the track index endpoint, e.g. `https://example.com/api/v1`.
    pub base_url: String,
    /// Path of the paginated track index below `base_url`.
    pub path: String,
    /// Number of tracks requested per page.
    pub page_size: usize,
    /// Prefix for relative `audio_source`/`cover` paths. Empty leaves them untouched.
    pub media_base_url: String,
    /// Timeout for a single page request (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/v1".to_string(),
            path: "/music".to_string(),
            page_size: 10,
            media_base_url: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Repeat mode the engine starts with.
    pub repeat_mode: RepeatModeSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            repeat_mode: RepeatModeSetting::Off,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatModeSetting {
    #[serde(alias = "none", alias = "no-loop", alias = "no_loop")]
    Off,
    #[serde(
        alias = "loopall",
        alias = "loop_all",
        alias = "loop-all",
        alias = "repeat-all",
        alias = "playlist"
    )]
    All,
    #[serde(
        alias = "loopone",
        alias = "loop_one",
        alias = "loop-one",
        alias = "repeat-one",
        alias = "track"
    )]
    One,
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(s: RepeatModeSetting) -> Self {
        match s {
            RepeatModeSetting::Off => RepeatMode::Off,
            RepeatModeSetting::All => RepeatMode::All,
            RepeatModeSetting::One => RepeatMode::One,
        }
    }
}
