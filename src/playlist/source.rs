//! The fetch contract for the paginated track index and its HTTP implementation.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::PlaylistSettings;
use crate::library::RawTrack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct PageResponse {
    pub results: Vec<RawTrack>,
    /// Cursor for the following page when the server provides one.
    pub next_offset: Option<usize>,
    /// Total number of tracks on the server, if reported.
    pub total: Option<usize>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed page: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that can serve pages of tracks.
pub trait TrackSource: Send + Sync {
    fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError>;
}

/// Body of a track index response.
#[derive(Debug, Deserialize)]
pub struct PageBody {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<RawTrack>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub next_offset: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PageBody {
    pub fn parse(text: &str) -> Result<PageResponse, FetchError> {
        let body: PageBody = serde_json::from_str(text)?;
        body.into_response()
    }

    /// A `success: false` body reads as an empty page, which ends the list.
    pub fn into_response(self) -> Result<PageResponse, FetchError> {
        if !self.success {
            log::warn!(
                "track index answered success=false: {}",
                self.message.as_deref().unwrap_or("no message")
            );
            return Ok(PageResponse {
                results: Vec::new(),
                next_offset: None,
                total: self.count,
            });
        }
        Ok(PageResponse {
            results: self.results,
            next_offset: self.next_offset,
            total: self.count,
        })
    }
}

/// `GET {base_url}{path}?offset=..&limit=..` over a blocking `reqwest` client.
pub struct HttpTrackSource {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpTrackSource {
    pub fn new(settings: &PlaylistSettings) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("neuroplayer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint_url(&settings.base_url, &settings.path),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TrackSource for HttpTrackSource {
    fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("offset", request.offset), ("limit", request.limit)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        PageBody::parse(&response.text()?)
    }
}

pub(crate) fn endpoint_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}
