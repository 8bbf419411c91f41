// src/testutil.rs
//! Shared helpers for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;

use crate::providers::{ChannelStatsProvider, VideoStatsProvider};
use crate::types::{ChannelStats, SearchStub, VideoSeed, VideoStats};

/// RNG that always draws the bottom of any range, pinning score jitter to 0.
pub(crate) struct ZeroRng;

impl rand::RngCore for ZeroRng {
    fn next_u32(&mut self) -> u32 {
        0
    }
    fn next_u64(&mut self) -> u64 {
        0
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }
}

pub(crate) fn seed(video_id: &str, channel_id: &str, rank: u32) -> VideoSeed {
    VideoSeed {
        video_id: video_id.into(),
        title: format!("video {video_id}"),
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

pub(crate) fn video_stats(views: u64) -> VideoStats {
    VideoStats {
        views,
        likes: Some(views / 20),
        comments: Some(views / 100),
        published_at: "2026-08-20T00:00:00Z".into(),
        duration_sec: 600,
        description: String::new(),
        tags: Vec::new(),
        category_id: String::new(),
        topic_categories: Vec::new(),
    }
}

pub(crate) fn channel_stats(subs: u64) -> ChannelStats {
    ChannelStats {
        subs,
        channel_created_at: "2020-01-01T00:00:00Z".into(),
        total_views: subs.saturating_mul(100),
        video_count: 200,
    }
}

// ---- provider doubles -----------------------------------------------------

pub(crate) struct MockVideos {
    map: HashMap<String, VideoStats>,
    fail: bool,
    requested: Mutex<Vec<String>>,
}

impl MockVideos {
    pub fn with_views(entries: &[(&str, u64)]) -> Self {
        Self::with_stats(
            entries
                .iter()
                .map(|(id, views)| (id.to_string(), video_stats(*views)))
                .collect(),
        )
    }

    pub fn with_stats(map: HashMap<String, VideoStats>) -> Self {
        Self {
            map,
            fail: false,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            map: HashMap::new(),
            fail: true,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl VideoStatsProvider for MockVideos {
    async fn fetch_videos(&self, video_ids: &[String]) -> Result<HashMap<String, VideoStats>> {
        self.requested.lock().unwrap().extend_from_slice(video_ids);
        if self.fail {
            anyhow::bail!("mock video provider down");
        }
        Ok(video_ids
            .iter()
            .filter_map(|id| self.map.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock-videos"
    }
}

pub(crate) struct MockChannels {
    map: HashMap<String, ChannelStats>,
    fail: bool,
    requested: Mutex<Vec<String>>,
}

impl MockChannels {
    pub fn with_subs(entries: &[(&str, u64)]) -> Self {
        Self {
            map: entries
                .iter()
                .map(|(id, subs)| (id.to_string(), channel_stats(*subs)))
                .collect(),
            fail: false,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            map: HashMap::new(),
            fail: true,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChannelStatsProvider for MockChannels {
    async fn fetch_channels(
        &self,
        channel_ids: &[String],
    ) -> Result<HashMap<String, ChannelStats>> {
        self.requested
            .lock()
            .unwrap()
            .extend_from_slice(channel_ids);
        if self.fail {
            anyhow::bail!("mock channel provider down");
        }
        Ok(channel_ids
            .iter()
            .filter_map(|id| self.map.get(id).map(|s| (id.clone(), s.clone())))
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock-channels"
    }
}

pub(crate) fn stub(video_id: &str, title: &str, channel_id: &str) -> SearchStub {
    SearchStub {
        video_id: video_id.into(),
        title: title.into(),
        channel_id: channel_id.into(),
        channel_name: format!("channel {channel_id}"),
        thumbnail_url: String::new(),
        published_at: "2026-08-01T00:00:00Z".into(),
    }
}
