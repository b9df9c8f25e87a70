//! Utilities for fetching media and creating `rodio` sinks from it.
//!
//! Media bytes are kept in memory so the audio thread can rebuild a sink at
//! any position without fetching again (e.g. seeking after a track ended).

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::tap::{SampleTap, Tap};
use super::types::AudioError;

/// Cheaply clonable media buffer.
#[derive(Clone)]
pub(super) struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Read the media behind `src`: an http(s) URL, a `file://` URL or a plain path.
pub(super) fn load_media(
    client: &reqwest::blocking::Client,
    src: &str,
) -> Result<SharedBytes, AudioError> {
    if src.starts_with("http://") || src.starts_with("https://") {
        let bytes = client.get(src).send()?.error_for_status()?.bytes()?;
        return Ok(SharedBytes(Arc::from(bytes.as_ref())));
    }
    let path = src.strip_prefix("file://").unwrap_or(src);
    let bytes = std::fs::read(path)?;
    Ok(SharedBytes(Arc::from(bytes)))
}

/// Create a paused `Sink` for `media` that starts at `start_at`.
///
/// Also returns the decoded length when the container reports one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    media: &SharedBytes,
    tap: &SampleTap,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), AudioError> {
    let decoder =
        Decoder::new(Cursor::new(media.clone())).map_err(|e| AudioError::Decode(e.to_string()))?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.append(Tap::new(decoder, tap.clone()));

    if !start_at.is_zero() {
        if let Err(e) = sink.try_seek(start_at) {
            log::warn!("seek to {:.2}s failed, starting from 0: {e}", start_at.as_secs_f64());
        }
    }
    Ok((sink, total))
}
