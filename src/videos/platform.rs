use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Largest page the uploads listing will return.
pub const API_MAX_RESULTS: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistItem {
    pub video_id: String,
    pub title: String,
    pub description: String,
    /// As sent by the platform; normalized by the ingestor.
    pub published_at: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistPage {
    pub items: Vec<PlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum PlatformError {
    /// Quota exhausted or access denied (HTTP 403).
    #[error("{endpoint}: forbidden (403): {message}")]
    Forbidden { endpoint: &'static str, message: String },
    #[error("{endpoint}: HTTP {status}: {message}")]
    Status { endpoint: &'static str, status: u16, message: String },
    #[error("{endpoint}: {source}")]
    Http { endpoint: &'static str, #[source] source: reqwest::Error },
}

/// The three lookups the video ingestor needs from the platform.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Id of the channel's uploads collection, `None` if the channel is unknown.
    async fn uploads_playlist(&self, channel_id: &str) -> Result<Option<String>, PlatformError>;

    /// One page of the collection, newest first.
    async fn playlist_page(&self, playlist_id: &str, page_token: Option<&str>, max_results: u32) -> Result<PlaylistPage, PlatformError>;

    /// ISO-8601 durations keyed by video id; unknown ids are simply absent.
    async fn durations(&self, video_ids: &[String]) -> Result<HashMap<String, String>, PlatformError>;
}
