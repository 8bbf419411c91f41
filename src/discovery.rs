// src/discovery.rs
//! Finds under-exposed counterparts ("silenced" videos) for the highest
//! scoring noise videos.
//!
//! For each of the top 10 noise videos, in parallel:
//! 1. Build a keyword query from the title.
//! 2. Search for up to 25 relevance-ordered candidates.
//! 3. Enrich them with video and channel stats (both calls concurrent).
//! 4. Hard-filter: small channel, modest views, no shorts, no spam titles,
//!    never a channel already on the feed.
//! 5. Progressively relax the view/sub windows while fewer than 3 survive.
//! 6. Score survivors and pick the best one.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::derived::age_hours_at;
use crate::keywords::build_query;
use crate::providers::{ChannelStatsProvider, SearchProvider, VideoStatsProvider};
use crate::telemetry::ensure_metrics_described;
use crate::types::{CandidateVideo, ScoredVideo, SilencedCandidate, WhySilenced};

pub const MAX_SEARCH_RESULTS: u32 = 25;
/// Broadening stops once at least this many candidates survive the filter.
pub const MIN_SURVIVORS: usize = 3;
/// Only the highest-scoring noise videos get a discovery pass.
pub const MAX_NOISE_VIDEOS: usize = 10;

/// Hard filter window for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
    pub subs_min: u64,
    pub subs_max: u64,
    pub views_min: u64,
    pub views_max: u64,
    pub duration_min_sec: u64,
}

pub const BASE_CONSTRAINTS: Constraints = Constraints {
    subs_min: 1_000,
    subs_max: 100_000,
    views_min: 5_000,
    views_max: 300_000,
    duration_min_sec: 120,
};

impl Default for Constraints {
    fn default() -> Self {
        BASE_CONSTRAINTS
    }
}

/// Partial relaxation applied over the base window; unset fields keep the
/// base values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintOverride {
    pub views: Option<(u64, u64)>,
    pub subs: Option<(u64, u64)>,
}

pub const BROADEN_STEPS: [ConstraintOverride; 3] = [
    ConstraintOverride {
        views: Some((2_000, 500_000)),
        subs: None,
    },
    ConstraintOverride {
        views: None,
        subs: Some((500, 200_000)),
    },
    ConstraintOverride {
        views: Some((1_000, 1_000_000)),
        subs: None,
    },
];

impl Constraints {
    pub fn with_override(mut self, o: &ConstraintOverride) -> Self {
        if let Some((min, max)) = o.views {
            self.views_min = min;
            self.views_max = max;
        }
        if let Some((min, max)) = o.subs {
            self.subs_min = min;
            self.subs_max = max;
        }
        self
    }
}

// Spam/low-effort channel and title markers.
static BLACKLIST_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["compilation", "clips", "highlights", "best of", "top 10"]
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid blacklist pattern"))
        .collect()
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("No query")]
    NoQuery,
    #[error("No search results")]
    NoSearchResults,
    #[error("All filtered out")]
    AllFilteredOut,
}

/// Candidates that survive the hard filter, in search order.
pub fn filter_candidates<'a>(
    candidates: &'a [CandidateVideo],
    constraints: &Constraints,
    exclude_channels: &HashSet<String>,
) -> Vec<&'a CandidateVideo> {
    candidates
        .iter()
        .filter(|c| {
            let (Some(stats), Some(channel)) = (&c.stats, &c.channel) else {
                return false;
            };
            if exclude_channels.contains(&c.stub.channel_id) {
                return false;
            }
            if channel.subs < constraints.subs_min || channel.subs > constraints.subs_max {
                return false;
            }
            if stats.views < constraints.views_min || stats.views > constraints.views_max {
                return false;
            }
            if stats.duration_sec < constraints.duration_min_sec {
                return false;
            }
            if BLACKLIST_PATTERNS
                .iter()
                .any(|p| p.is_match(&c.stub.title) || p.is_match(&c.stub.channel_name))
            {
                return false;
            }
            if c.stub.title.to_lowercase().contains("#shorts") {
                return false;
            }
            true
        })
        .collect()
}

/// Quality score 0..100 for a surviving candidate: engagement rates, viral
/// potential, duration sweet spot, small-channel bonus, old-video penalty.
pub fn quality_score_at(candidate: &CandidateVideo, now: DateTime<Utc>) -> u8 {
    let (Some(stats), Some(channel)) = (&candidate.stats, &candidate.channel) else {
        return 0;
    };
    let views = stats.views;
    let subs = channel.subs;

    let like_rate = match (stats.likes, views) {
        (Some(likes), v) if v > 0 => likes as f64 / v as f64,
        _ => 0.03,
    };
    let like_score = (like_rate / 0.05).min(1.0) * 30.0;

    let comment_rate = match (stats.comments, views) {
        (Some(comments), v) if v > 0 => comments as f64 / v as f64,
        _ => 0.001,
    };
    let comment_score = (comment_rate / 0.005).min(1.0) * 15.0;

    let views_per_sub = if subs > 0 {
        views as f64 / subs as f64
    } else {
        0.0
    };
    let viral_score = (views_per_sub / 2.0).min(1.0) * 20.0;

    // 6..20 minutes is the sweet spot; shorter clips taper off fast.
    let duration_min = stats.duration_sec as f64 / 60.0;
    let duration_score = if (6.0..=20.0).contains(&duration_min) {
        15.0
    } else if duration_min >= 2.0 {
        (15.0 - (duration_min - 13.0).abs() / 2.0).max(0.0)
    } else {
        0.0
    };

    let small_channel_bonus = if subs < 50_000 {
        10.0
    } else if subs < 100_000 {
        5.0
    } else {
        0.0
    };

    // Unparseable timestamps read as age 0 and draw no penalty.
    let age_months = age_hours_at(&stats.published_at, now) / (24.0 * 30.0);
    let age_penalty = if age_months > 24.0 { -10.0 } else { 0.0 };

    let total = like_score + comment_score + viral_score + duration_score + small_channel_bonus
        + age_penalty;
    total.clamp(0.0, 100.0).round() as u8
}

/// Joins search stubs with their stats, concurrently, degrading to `None`
/// entries when a provider call fails.
pub async fn enrich_candidates(
    stubs: Vec<crate::types::SearchStub>,
    videos: &dyn VideoStatsProvider,
    channels: &dyn ChannelStatsProvider,
) -> Vec<CandidateVideo> {
    if stubs.is_empty() {
        return Vec::new();
    }
    let video_ids: Vec<String> = stubs.iter().map(|s| s.video_id.clone()).collect();
    let channel_ids: Vec<String> = {
        let mut seen = HashSet::new();
        stubs
            .iter()
            .map(|s| s.channel_id.as_str())
            .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
            .map(str::to_owned)
            .collect()
    };

    let (video_res, channel_res) = tokio::join!(
        videos.fetch_videos(&video_ids),
        channels.fetch_channels(&channel_ids)
    );
    let video_map = video_res.unwrap_or_else(|e| {
        warn!(error = %e, "candidate video stats fetch failed");
        counter!("provider_errors_total").increment(1);
        HashMap::new()
    });
    let channel_map = channel_res.unwrap_or_else(|e| {
        warn!(error = %e, "candidate channel stats fetch failed");
        counter!("provider_errors_total").increment(1);
        HashMap::new()
    });

    stubs
        .into_iter()
        .map(|stub| {
            let stats = video_map.get(&stub.video_id).cloned();
            let channel = channel_map.get(&stub.channel_id).cloned();
            CandidateVideo {
                stub,
                stats,
                channel,
            }
        })
        .collect()
}

/// One discovery pass for a single noise video.
pub async fn find_silenced_for_video(
    noise: &ScoredVideo,
    search: &dyn SearchProvider,
    videos: &dyn VideoStatsProvider,
    channels: &dyn ChannelStatsProvider,
    exclude_channels: &HashSet<String>,
    now: DateTime<Utc>,
) -> Result<SilencedCandidate, DiscoveryError> {
    // No query means no work: zero provider calls.
    let query = build_query(&noise.video.seed.title).ok_or(DiscoveryError::NoQuery)?;
    info!(noise = %noise.video.seed.video_id, %query, "searching for silenced counterpart");

    let stubs = search
        .search(&query, MAX_SEARCH_RESULTS)
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "candidate search failed");
            counter!("provider_errors_total").increment(1);
            Vec::new()
        });
    if stubs.is_empty() {
        return Err(DiscoveryError::NoSearchResults);
    }

    let enriched = enrich_candidates(stubs, videos, channels).await;

    let mut filtered = filter_candidates(&enriched, &BASE_CONSTRAINTS, exclude_channels);
    for step in BROADEN_STEPS.iter() {
        if filtered.len() >= MIN_SURVIVORS {
            break;
        }
        let relaxed = BASE_CONSTRAINTS.with_override(step);
        filtered = filter_candidates(&enriched, &relaxed, exclude_channels);
        debug!(survivors = filtered.len(), ?relaxed, "broadened constraints");
    }
    if filtered.is_empty() {
        return Err(DiscoveryError::AllFilteredOut);
    }
    let candidate_count = filtered.len();

    let mut scored: Vec<(&CandidateVideo, u8)> = filtered
        .into_iter()
        .map(|c| (c, quality_score_at(c, now)))
        .collect();
    // Stable sort: search relevance breaks quality ties.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    let (best, quality_score) = scored[0];

    let stats = best.stats.as_ref().ok_or(DiscoveryError::AllFilteredOut)?;
    let channel = best.channel.as_ref().ok_or(DiscoveryError::AllFilteredOut)?;
    let like_rate_pct = match (stats.likes, stats.views) {
        (Some(likes), views) if likes > 0 && views > 0 => {
            Some((likes as f64 / views as f64 * 10_000.0).round() / 100.0)
        }
        _ => None,
    };

    Ok(SilencedCandidate {
        noise_video_id: noise.video.seed.video_id.clone(),
        silenced_video: best.clone(),
        why_silenced: WhySilenced {
            subs: channel.subs,
            views: stats.views,
            like_rate_pct,
            duration_min: (stats.duration_sec as f64 / 60.0).round() as u64,
        },
        quality_score,
        query,
        candidate_count,
    })
}

/// Discovery over a scored batch: top 10 noise videos in parallel, failures
/// dropped from the result.
pub async fn find_silenced_videos(
    scored: &[ScoredVideo],
    search: &dyn SearchProvider,
    videos: &dyn VideoStatsProvider,
    channels: &dyn ChannelStatsProvider,
) -> Vec<SilencedCandidate> {
    ensure_metrics_described();
    if scored.is_empty() {
        return Vec::new();
    }

    let mut by_bias: Vec<&ScoredVideo> = scored.iter().collect();
    by_bias.sort_by(|a, b| b.bias_score.cmp(&a.bias_score));
    let top: Vec<&ScoredVideo> = by_bias.into_iter().take(MAX_NOISE_VIDEOS).collect();

    // Never recommend a channel that is already on the feed.
    let exclude_channels: HashSet<String> = scored
        .iter()
        .map(|v| v.video.seed.channel_id.clone())
        .filter(|id| !id.is_empty())
        .collect();

    let now = Utc::now();
    counter!("discovery_attempts_total").increment(top.len() as u64);
    let results = futures::future::join_all(top.iter().map(|noise| {
        find_silenced_for_video(noise, search, videos, channels, &exclude_channels, now)
    }))
    .await;

    let mut out = Vec::new();
    for (noise, result) in top.iter().zip(results) {
        match result {
            Ok(pick) => out.push(pick),
            Err(e) => {
                debug!(noise = %noise.video.seed.video_id, error = %e, "no silenced pick");
                counter!("discovery_failed_total").increment(1);
            }
        }
    }
    info!(requested = top.len(), found = out.len(), "discovery complete");
    out
}
