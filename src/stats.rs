// src/stats.rs
//! Batch percentile statistics and value normalization.
//!
//! `GlobalStats` is the cross-video context that makes bias scores relative
//! rather than absolute: computed once per batch, then passed read-only into
//! every per-video scorer call. Nothing here is ever persisted — a fresh
//! request recomputes from scratch.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::derived::{compute_derived_metrics_at, DerivedMetrics};
use crate::types::EnrichedVideo;

/// Descriptive statistics over one numeric field across the active batch.
/// All fields are 0 when the (filtered) input set is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PercentileStats {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Per-metric percentile stats for the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub views_per_hour: PercentileStats,
    pub subs: PercentileStats,
    pub like_rate: PercentileStats,
    pub comment_rate: PercentileStats,
    pub views_per_sub: PercentileStats,
    pub views: PercentileStats,
    pub age_hours: PercentileStats,
    pub duration_sec: PercentileStats,
}

/// Compute percentile stats for a slice of values.
///
/// Non-finite entries are dropped first. Percentile `p` is nearest-rank with
/// a 0-based floor index, `sorted[floor(p/100 * (n-1))]` — no interpolation.
/// That tie-break is part of the contract; downstream scores depend on it
/// being stable.
pub fn compute_percentiles(values: &[f64]) -> PercentileStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return PercentileStats::default();
    }
    sorted.sort_by(f64::total_cmp);

    let at = |p: f64| sorted[((p / 100.0) * (sorted.len() - 1) as f64).floor() as usize];
    let sum: f64 = sorted.iter().sum();

    PercentileStats {
        p25: at(25.0),
        p50: at(50.0),
        p75: at(75.0),
        p95: at(95.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: sum / sorted.len() as f64,
    }
}

/// Compute global stats for a batch at a fixed `now`; `None` for an empty
/// batch. Rate percentiles exclude hidden (`None`) entries entirely — a
/// hidden like count must not drag the distribution toward zero.
pub fn compute_global_stats_at(
    videos: &[EnrichedVideo],
    now: DateTime<Utc>,
) -> Option<GlobalStats> {
    if videos.is_empty() {
        return None;
    }

    let all: Vec<DerivedMetrics> = videos
        .iter()
        .map(|v| compute_derived_metrics_at(v, now))
        .collect();

    let collect = |f: fn(&DerivedMetrics) -> f64| -> Vec<f64> { all.iter().map(f).collect() };
    let like_rates: Vec<f64> = all.iter().filter_map(|m| m.like_rate).collect();
    let comment_rates: Vec<f64> = all.iter().filter_map(|m| m.comment_rate).collect();

    Some(GlobalStats {
        views_per_hour: compute_percentiles(&collect(|m| m.views_per_hour)),
        subs: compute_percentiles(&collect(|m| m.subs as f64)),
        like_rate: compute_percentiles(&like_rates),
        comment_rate: compute_percentiles(&comment_rates),
        views_per_sub: compute_percentiles(&collect(|m| m.views_per_sub)),
        views: compute_percentiles(&collect(|m| m.views as f64)),
        age_hours: compute_percentiles(&collect(|m| m.age_hours)),
        duration_sec: compute_percentiles(&collect(|m| m.duration_sec as f64)),
    })
}

/// Wall-clock wrapper around [`compute_global_stats_at`].
pub fn compute_global_stats(videos: &[EnrichedVideo]) -> Option<GlobalStats> {
    compute_global_stats_at(videos, Utc::now())
}

/// Normalize a value to 0..1 relative to the batch p95.
/// Returns 0 when `p95 == 0` — a batch with no variance collapses all
/// percentile-normalized scores to 0 (accepted tradeoff, not a bug).
pub fn normalize_by_percentile(value: f64, stats: &PercentileStats) -> f64 {
    if stats.p95 == 0.0 {
        return 0.0;
    }
    (value / stats.p95).clamp(0.0, 1.0)
}

/// Min-max scale a value into 0..1; 0 when the range is degenerate.
pub fn normalize_min_max(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
