// src/providers/youtube.rs
//! YouTube Data API v3 adapter.
//!
//! Implements all three provider traits against `videos.list`,
//! `channels.list` and `search.list`. Count fields arrive as strings and may
//! be absent entirely when a channel hides them; absence maps to `None`, not
//! zero. Search titles come back HTML-entity-encoded and are decoded here so
//! the keyword tokenizer sees real text.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::derived::parse_iso8601_duration;
use crate::types::{ChannelStats, SearchStub, VideoStats};

use super::{ChannelStatsProvider, SearchProvider, VideoStatsProvider};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin HTTP client over the Data API. One instance serves all three
/// provider roles; it is cheap to clone (reqwest pools internally).
#[derive(Clone)]
pub struct YouTubeDataApi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, API_BASE)
    }

    /// Base URL override for tests against a local stub server.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("reqwest client");
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let started = Instant::now();
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("youtube: {endpoint} request failed"))?;
        histogram!("provider_fetch_ms").record(started.elapsed().as_millis() as f64);
        let status = resp.status();
        if !status.is_success() {
            counter!("provider_errors_total").increment(1);
            anyhow::bail!("youtube: {endpoint} returned {status}");
        }
        resp.json::<T>()
            .await
            .with_context(|| format!("youtube: {endpoint} body decode failed"))
    }
}

// ---- wire shapes ----------------------------------------------------------

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
    #[serde(rename = "topicDetails")]
    topic_details: Option<TopicDetails>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category_id: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Deserialize, Default)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TopicDetails {
    #[serde(default)]
    topic_categories: Vec<String>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    #[serde(default)]
    published_at: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    view_count: Option<String>,
    video_count: Option<String>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Option<SearchSnippet>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    #[serde(default)]
    video_id: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: SearchThumbnails,
}

#[derive(Deserialize, Default)]
struct SearchThumbnails {
    medium: Option<ThumbInfo>,
    default: Option<ThumbInfo>,
}

#[derive(Deserialize, Default)]
struct ThumbInfo {
    #[serde(default)]
    url: String,
}

/// "12345" -> Some(12345); absent or unparseable -> None (hidden count).
fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.parse::<u64>().ok())
}

impl From<VideoItem> for VideoStats {
    fn from(item: VideoItem) -> Self {
        let snippet = item.snippet.unwrap_or_default();
        let statistics = item.statistics.unwrap_or_default();
        let content = item.content_details.unwrap_or_default();
        let topics = item.topic_details.unwrap_or_default();
        VideoStats {
            views: parse_count(statistics.view_count.as_deref()).unwrap_or(0),
            likes: parse_count(statistics.like_count.as_deref()),
            comments: parse_count(statistics.comment_count.as_deref()),
            published_at: snippet.published_at,
            duration_sec: parse_iso8601_duration(&content.duration),
            description: snippet.description,
            tags: snippet.tags,
            category_id: snippet.category_id,
            topic_categories: topics.topic_categories,
        }
    }
}

#[async_trait::async_trait]
impl VideoStatsProvider for YouTubeDataApi {
    async fn fetch_videos(&self, video_ids: &[String]) -> Result<HashMap<String, VideoStats>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = video_ids.join(",");
        let resp: ListResponse<VideoItem> = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,statistics,contentDetails,topicDetails"),
                    ("id", ids.as_str()),
                ],
            )
            .await?;
        tracing::debug!(requested = video_ids.len(), returned = resp.items.len(), "videos.list");
        Ok(resp
            .items
            .into_iter()
            .map(|item| (item.id.clone(), VideoStats::from(item)))
            .collect())
    }

    fn name(&self) -> &'static str {
        "youtube-data-api"
    }
}

#[async_trait::async_trait]
impl ChannelStatsProvider for YouTubeDataApi {
    async fn fetch_channels(
        &self,
        channel_ids: &[String],
    ) -> Result<HashMap<String, ChannelStats>> {
        if channel_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids = channel_ids.join(",");
        let resp: ListResponse<ChannelItem> = self
            .get_json(
                "channels",
                &[("part", "snippet,statistics"), ("id", ids.as_str())],
            )
            .await?;
        tracing::debug!(
            requested = channel_ids.len(),
            returned = resp.items.len(),
            "channels.list"
        );
        Ok(resp
            .items
            .into_iter()
            .map(|item| {
                let snippet = item.snippet.unwrap_or_default();
                let statistics = item.statistics.unwrap_or_default();
                let stats = ChannelStats {
                    subs: parse_count(statistics.subscriber_count.as_deref()).unwrap_or(0),
                    channel_created_at: snippet.published_at,
                    total_views: parse_count(statistics.view_count.as_deref()).unwrap_or(0),
                    video_count: parse_count(statistics.video_count.as_deref()).unwrap_or(0),
                };
                (item.id, stats)
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "youtube-data-api"
    }
}

#[async_trait::async_trait]
impl SearchProvider for YouTubeDataApi {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchStub>> {
        let max = max_results.to_string();
        let resp: ListResponse<SearchItem> = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("order", "relevance"),
                    ("maxResults", max.as_str()),
                    ("q", query),
                ],
            )
            .await?;
        tracing::debug!(query, returned = resp.items.len(), "search.list");
        Ok(resp
            .items
            .into_iter()
            .filter(|item| !item.id.video_id.is_empty())
            .map(|item| {
                let snippet = item.snippet.unwrap_or_default();
                let thumbnail_url = snippet
                    .thumbnails
                    .medium
                    .or(snippet.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                SearchStub {
                    video_id: item.id.video_id,
                    // search.list titles are entity-encoded ("&amp;", "&#39;").
                    title: html_escape::decode_html_entities(&snippet.title).into_owned(),
                    channel_id: snippet.channel_id,
                    channel_name: snippet.channel_title,
                    thumbnail_url,
                    published_at: snippet.published_at,
                }
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "youtube-data-api"
    }
}
