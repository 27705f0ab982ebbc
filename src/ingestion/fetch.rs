use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;

use super::parse;
use super::types::FeedEntry;

const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid feed_url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("fetch {url}: {source}")]
    Fetch { url: String, #[source] source: reqwest::Error },
    #[error("fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Where feed entries come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Entries of one feed, in feed order.
    async fn entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedError>;
}

pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(HttpFeedSource { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let body = fetch_feed(&self.client, feed_url).await?;
        parse::parse_entries(&body).map_err(|reason| FeedError::Parse { url: feed_url.to_string(), reason })
    }
}

pub async fn fetch_feed(client: &Client, url: &str) -> Result<Bytes, FeedError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|source| FeedError::Fetch { url: url.to_string(), source })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::Status { url: url.to_string(), status: status.as_u16() });
    }
    resp.bytes().await.map_err(|source| FeedError::Fetch { url: url.to_string(), source })
}
