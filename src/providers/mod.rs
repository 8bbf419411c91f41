// src/providers/mod.rs
//! Collaborator interfaces for external data sources.
//!
//! The core treats every provider the same way: a failed call is caught at
//! the boundary and becomes empty data, never a raised error inside the
//! pipeline. Timeout policy belongs to the implementations.

pub mod youtube;

use std::collections::HashMap;

use anyhow::Result;

use crate::types::{ChannelStats, SearchStub, VideoStats};

/// Batch fetch of per-video statistics. IDs missing from the returned map
/// are treated as `None` downstream.
#[async_trait::async_trait]
pub trait VideoStatsProvider: Send + Sync {
    async fn fetch_videos(&self, video_ids: &[String]) -> Result<HashMap<String, VideoStats>>;
    fn name(&self) -> &'static str;
}

/// Batch fetch of channel statistics.
#[async_trait::async_trait]
pub trait ChannelStatsProvider: Send + Sync {
    async fn fetch_channels(&self, channel_ids: &[String])
        -> Result<HashMap<String, ChannelStats>>;
    fn name(&self) -> &'static str;
}

/// Relevance-ordered candidate search.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchStub>>;
    fn name(&self) -> &'static str;
}
