use super::*;

fn raw(json: &str) -> RawTrack {
    serde_json::from_str(json).unwrap()
}

#[test]
fn track_from_raw_stringifies_numeric_ids_and_defaults_artist() {
    let t = track_from_raw(
        raw(r#"{"id": 42, "title": "Night Drive", "audio_source": "https://cdn.test/a.mp3"}"#),
        "",
    );
    assert_eq!(t.id, "42");
    assert_eq!(t.artist, "Unknown");
    assert_eq!(t.src, "https://cdn.test/a.mp3");
    assert_eq!(t.cover, None);

    let t = track_from_raw(
        raw(r#"{"id": "x1", "title": "T", "artist": "   ", "audio_source": "a.mp3"}"#),
        "",
    );
    assert_eq!(t.id, "x1");
    assert_eq!(t.artist, "Unknown");
}

#[test]
fn track_from_raw_accepts_audio_file_alias_and_resolves_relative_paths() {
    let t = track_from_raw(
        raw(
            r#"{"id": 1, "title": "T", "artist": "A", "audio_file": "/music/t.mp3", "cover": "covers/t.jpg"}"#,
        ),
        "https://cdn.test/",
    );
    assert_eq!(t.src, "https://cdn.test/music/t.mp3");
    assert_eq!(t.cover.as_deref(), Some("https://cdn.test/covers/t.jpg"));
}

#[test]
fn resolve_media_url_keeps_absolute_urls() {
    assert_eq!(
        resolve_media_url("https://cdn.test", "https://other.test/x.mp3"),
        "https://other.test/x.mp3"
    );
    assert_eq!(resolve_media_url("", "/local/x.mp3"), "/local/x.mp3");
}

#[test]
fn display_prefers_artist_dash_title() {
    let mut t = track_from_raw(
        raw(r#"{"id": 1, "title": "Song", "artist": "Artist", "audio_source": "s.mp3"}"#),
        "",
    );
    assert_eq!(t.display(), "Artist - Song");
    t.artist = " ".into();
    assert_eq!(t.display(), "Song");
}
