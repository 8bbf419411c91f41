// src/enrich.rs
//! Joins homepage seeds with stats from the two data providers.
//!
//! Both provider calls run concurrently. A failed call degrades to an empty
//! map with a warning; the batch still goes through and scoring falls back
//! to its documented defaults. Seed order is preserved in the output.

use std::collections::{HashMap, HashSet};

use metrics::counter;
use tracing::warn;

use crate::providers::{ChannelStatsProvider, VideoStatsProvider};
use crate::telemetry::ensure_metrics_described;
use crate::types::{EnrichedVideo, VideoSeed};

pub async fn enrich_seeds(
    seeds: &[VideoSeed],
    videos: &dyn VideoStatsProvider,
    channels: &dyn ChannelStatsProvider,
) -> Vec<EnrichedVideo> {
    ensure_metrics_described();
    if seeds.is_empty() {
        return Vec::new();
    }
    counter!("enrich_batches_total").increment(1);

    let video_ids: Vec<String> = unique_ids(seeds.iter().map(|s| s.video_id.as_str()));
    let channel_ids: Vec<String> = unique_ids(seeds.iter().map(|s| s.channel_id.as_str()));

    let (video_res, channel_res) = tokio::join!(
        videos.fetch_videos(&video_ids),
        channels.fetch_channels(&channel_ids)
    );

    let video_map = video_res.unwrap_or_else(|e| {
        warn!(provider = videos.name(), error = %e, "video stats fetch failed");
        counter!("provider_errors_total").increment(1);
        HashMap::new()
    });
    let channel_map = channel_res.unwrap_or_else(|e| {
        warn!(provider = channels.name(), error = %e, "channel stats fetch failed");
        counter!("provider_errors_total").increment(1);
        HashMap::new()
    });

    let mut missing = 0u64;
    let out: Vec<EnrichedVideo> = seeds
        .iter()
        .map(|seed| {
            let stats = video_map.get(&seed.video_id).cloned();
            let channel = channel_map.get(&seed.channel_id).cloned();
            if stats.is_none() {
                missing += 1;
            }
            EnrichedVideo {
                seed: seed.clone(),
                stats,
                channel,
            }
        })
        .collect();
    if missing > 0 {
        counter!("enrich_missing_stats_total").increment(missing);
    }
    tracing::debug!(seeds = seeds.len(), missing, "enriched batch");
    out
}

/// Distinct non-empty IDs in first-seen order.
fn unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_owned)
        .collect()
}
