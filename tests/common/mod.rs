// tests/common/mod.rs
//
// Shared provider doubles and fixture builders for integration tests.
// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use bias_lens::providers::{ChannelStatsProvider, SearchProvider, VideoStatsProvider};
use bias_lens::types::{ChannelStats, SearchStub, VideoSeed, VideoStats};

pub fn seed(video_id: &str, title: &str, channel_id: &str, rank: u32) -> VideoSeed {
    VideoSeed {
        video_id: video_id.into(),
        title: title.into(),
        channel_id: channel_id.into(),
        channel_name: format!("channel {channel_id}"),
        thumbnail_url: String::new(),
        duration_text: String::new(),
        published_time_text: String::new(),
        view_count_text: String::new(),
        href: String::new(),
        rank,
    }
}

pub fn video_stats(views: u64, published_at: &str, duration_sec: u64) -> VideoStats {
    VideoStats {
        views,
        likes: Some(views / 20),
        comments: Some(views / 200),
        published_at: published_at.into(),
        duration_sec,
        description: String::new(),
        tags: Vec::new(),
        category_id: String::new(),
        topic_categories: Vec::new(),
    }
}

pub fn channel_stats(subs: u64) -> ChannelStats {
    ChannelStats {
        subs,
        channel_created_at: "2019-01-01T00:00:00Z".into(),
        total_views: subs.saturating_mul(150),
        video_count: 300,
    }
}

pub fn search_stub(video_id: &str, title: &str, channel_id: &str) -> SearchStub {
    SearchStub {
        video_id: video_id.into(),
        title: title.into(),
        channel_id: channel_id.into(),
        channel_name: format!("channel {channel_id}"),
        thumbnail_url: String::new(),
        published_at: "2026-06-01T00:00:00Z".into(),
    }
}

#[derive(Default)]
pub struct StaticVideos {
    pub map: HashMap<String, VideoStats>,
    pub calls: Mutex<u32>,
}

impl StaticVideos {
    pub fn new(map: HashMap<String, VideoStats>) -> Self {
        Self {
            map,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl VideoStatsProvider for StaticVideos {
    async fn fetch_videos(&self, video_ids: &[String]) -> Result<HashMap<String, VideoStats>> {
        *self.calls.lock().unwrap() += 1;
        Ok(video_ids
            .iter()
            .filter_map(|id| self.map.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }

    fn name(&self) -> &'static str {
        "static-videos"
    }
}

#[derive(Default)]
pub struct StaticChannels {
    pub map: HashMap<String, ChannelStats>,
}

impl StaticChannels {
    pub fn new(map: HashMap<String, ChannelStats>) -> Self {
        Self { map }
    }
}

#[async_trait::async_trait]
impl ChannelStatsProvider for StaticChannels {
    async fn fetch_channels(
        &self,
        channel_ids: &[String],
    ) -> Result<HashMap<String, ChannelStats>> {
        Ok(channel_ids
            .iter()
            .filter_map(|id| self.map.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }

    fn name(&self) -> &'static str {
        "static-channels"
    }
}

#[derive(Default)]
pub struct StaticSearch {
    pub results: Vec<SearchStub>,
    pub calls: Mutex<u32>,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchStub>) -> Self {
        Self {
            results,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _query: &str, _max_results: u32) -> Result<Vec<SearchStub>> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.results.clone())
    }

    fn name(&self) -> &'static str {
        "static-search"
    }
}
