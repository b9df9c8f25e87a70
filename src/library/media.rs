use super::model::{RawTrack, Track};

const UNKNOWN_ARTIST: &str = "Unknown";

/// Resolve a possibly relative media path against `base`.
///
/// Absolute URLs (anything with a scheme) pass through unchanged, as do all
/// paths when `base` is empty.
pub fn resolve_media_url(base: &str, path: &str) -> String {
    let path = path.trim();
    if base.trim().is_empty() || path.contains("://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a wire track into the internal shape.
pub fn track_from_raw(raw: RawTrack, media_base: &str) -> Track {
    let artist = raw
        .artist
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let cover = raw
        .cover
        .filter(|c| !c.trim().is_empty())
        .map(|c| resolve_media_url(media_base, &c));

    Track {
        id: raw.id.to_string(),
        title: raw.title,
        artist,
        src: resolve_media_url(media_base, &raw.audio_source),
        cover,
    }
}
