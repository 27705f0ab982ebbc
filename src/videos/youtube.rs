use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::platform::{PlatformError, PlaylistItem, PlaylistPage, VideoPlatform};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube Data API v3, key-authenticated.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_base(api_key, API_BASE)
    }

    pub fn with_base(api_key: String, base: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(20)).build()?;
        Ok(YouTubeClient { client, api_key, base: base.trim_end_matches('/').to_string() })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str, query: &[(&str, String)]) -> Result<T, PlatformError> {
        let url = format!("{}/{}", self.base, endpoint);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| PlatformError::Http { endpoint, source })?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN {
            let message = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Forbidden { endpoint, message });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Status { endpoint, status: status.as_u16(), message });
        }
        resp.json::<T>().await.map_err(|source| PlatformError::Http { endpoint, source })
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn uploads_playlist(&self, channel_id: &str) -> Result<Option<String>, PlatformError> {
        let list: ChannelList = self
            .get_json("channels", &[("part", "contentDetails".to_string()), ("id", channel_id.to_string())])
            .await?;
        Ok(list.items.into_iter().next().map(|c| c.content_details.related_playlists.uploads))
    }

    async fn playlist_page(&self, playlist_id: &str, page_token: Option<&str>, max_results: u32) -> Result<PlaylistPage, PlatformError> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        if let Some(token) = page_token { query.push(("pageToken", token.to_string())); }
        let list: PlaylistItemList = self.get_json("playlistItems", &query).await?;
        Ok(list.into())
    }

    async fn durations(&self, video_ids: &[String]) -> Result<HashMap<String, String>, PlatformError> {
        if video_ids.is_empty() { return Ok(HashMap::new()); }
        let list: VideoList = self
            .get_json("videos", &[("part", "contentDetails".to_string()), ("id", video_ids.join(","))])
            .await?;
        Ok(list.items.into_iter().map(|v| (v.id, v.content_details.duration)).collect())
    }
}

// Response shapes, only the fields we read

#[derive(Deserialize)]
struct ChannelList {
    #[serde(default)]
    items: Vec<ChannelResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    content_details: ChannelContentDetails,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemList {
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct PlaylistItemResource {
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    published_at: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    resource_id: ResourceId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Deserialize)]
struct VideoList {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    content_details: VideoContentDetails,
}

#[derive(Deserialize)]
struct VideoContentDetails {
    #[serde(default)]
    duration: String,
}

impl From<PlaylistItemList> for PlaylistPage {
    fn from(list: PlaylistItemList) -> Self {
        let items = list
            .items
            .into_iter()
            .map(|r| PlaylistItem {
                video_id: r.snippet.resource_id.video_id,
                title: r.snippet.title,
                description: r.snippet.description,
                published_at: r.snippet.published_at,
            })
            .collect();
        PlaylistPage { items, next_page_token: list.next_page_token.filter(|t| !t.is_empty()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PLAYLIST_ITEMS: &str = r#"{
      "kind": "youtube#playlistItemListResponse",
      "nextPageToken": "CAIQAA",
      "items": [
        {"snippet": {"publishedAt": "2025-10-06T14:00:07Z", "title": "Rust in 100 seconds",
                     "description": "fast", "resourceId": {"kind": "youtube#video", "videoId": "abc123"}}},
        {"snippet": {"publishedAt": "2025-10-05T09:00:00Z", "title": "Older",
                     "resourceId": {"videoId": "def456"}}}
      ]
    }"#;

    #[test]
    fn playlist_items_map_to_page() {
        let list: PlaylistItemList = serde_json::from_str(PLAYLIST_ITEMS).unwrap();
        let page = PlaylistPage::from(list);
        assert_eq!(page.next_page_token.as_deref(), Some("CAIQAA"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].video_id, "abc123");
        assert_eq!(page.items[0].published_at, "2025-10-06T14:00:07Z");
        assert_eq!(page.items[1].description, "");
    }

    #[test]
    fn last_page_has_no_token() {
        let list: PlaylistItemList = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert_eq!(PlaylistPage::from(list), PlaylistPage::default());
    }

    #[tokio::test]
    async fn resolves_uploads_and_durations() {
        let mut server = mockito::Server::new_async().await;
        let _channels = server
            .mock("GET", "/channels")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "UC1".into()),
                Matcher::UrlEncoded("key".into(), "k".into()),
            ]))
            .with_body(r#"{"items": [{"contentDetails": {"relatedPlaylists": {"uploads": "UU1"}}}]}"#)
            .create_async()
            .await;
        let _videos = server
            .mock("GET", "/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "a,b".into()))
            .with_body(r#"{"items": [{"id": "a", "contentDetails": {"duration": "PT5M30S"}}]}"#)
            .create_async()
            .await;

        let yt = YouTubeClient::with_base("k".into(), &server.url()).unwrap();
        assert_eq!(yt.uploads_playlist("UC1").await.unwrap().as_deref(), Some("UU1"));
        let durations = yt.durations(&["a".to_string(), "b".to_string()]).await.unwrap();
        assert_eq!(durations.get("a").map(String::as_str), Some("PT5M30S"));
        assert!(!durations.contains_key("b"));
    }

    #[tokio::test]
    async fn unknown_channel_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/channels")
            .match_query(Matcher::Any)
            .with_body(r#"{"kind": "youtube#channelListResponse", "items": []}"#)
            .create_async()
            .await;
        let yt = YouTubeClient::with_base("k".into(), &server.url()).unwrap();
        assert_eq!(yt.uploads_playlist("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn quota_errors_are_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/playlistItems")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "quotaExceeded"}}"#)
            .create_async()
            .await;
        let yt = YouTubeClient::with_base("k".into(), &server.url()).unwrap();
        let err = yt.playlist_page("UU1", None, 7).await.unwrap_err();
        assert!(matches!(err, PlatformError::Forbidden { endpoint: "playlistItems", .. }));
    }
}
