//! Audio-related small types and handles.
//!
//! This module defines the commands understood by the audio thread, the
//! playback info it publishes, the graph state reported by backends and the
//! error type shared by all of them.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// Lifecycle of the processing context behind the analysis node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GraphState {
    /// Not constructed (or construction failed).
    #[default]
    Unavailable,
    /// Constructed but waiting for a user gesture before it may run.
    Suspended,
    /// Delivering real spectrum data.
    Running,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    DeviceUnavailable(String),
    #[error("no playback element")]
    NoElement,
    #[error("audio analysis is not supported: {0}")]
    GraphUnsupported(String),
    #[error("failed to fetch media: {0}")]
    Media(#[from] reqwest::Error),
    #[error("failed to read media: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode media: {0}")]
    Decode(String),
    #[error("playback was rejected: {0}")]
    Rejected(String),
    #[error("audio thread is gone")]
    ThreadGone,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source with the media at the given URL or path.
    Load(String),
    /// Start or resume playback.
    Play,
    /// Pause playback, keeping the position.
    Pause,
    /// Move to an absolute position; the resulting position is sent back.
    Seek { to: Duration, reply: Sender<Duration> },
    /// Set the output gain (0.0 - 1.0).
    SetVolume(f32),
    /// Stop playback and end the audio thread.
    Quit,
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information published by the audio thread.
pub struct PlaybackInfo {
    /// Position within the current source.
    pub position: Duration,
    /// Total length of the current source, when the decoder knows it.
    pub duration: Option<Duration>,
    /// Whether the sink is currently playing.
    pub playing: bool,
    /// Set once when the current source runs out; consumers clear it.
    pub ended: bool,
    /// Whether a source is loaded.
    pub loaded: bool,
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
