use serde::{Deserialize, Serialize};

/// A playable track. Identity is `id`; tracks are never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub src: String,
    pub cover: Option<String>,
}

impl Track {
    /// "Artist - Title" line used by status displays.
    pub fn display(&self) -> String {
        let artist = self.artist.trim();
        if artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", artist, self.title)
        }
    }
}

/// Track identifiers arrive as strings or numbers depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for RawId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A track as it appears on the wire in a page of results.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrack {
    pub id: RawId,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(alias = "audio_file")]
    pub audio_source: String,
    #[serde(default)]
    pub cover: Option<String>,
}
