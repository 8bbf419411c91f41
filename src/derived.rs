// src/derived.rs
//! Derived per-video metrics (age, velocity, engagement rates) and the
//! shared text parsers for ISO 8601 durations and "1.2M views" strings.
//!
//! Everything age-sensitive takes an explicit `now` so unit tests stay
//! deterministic; thin wrappers use the wall clock.
//!
//! Nullability contract: `like_rate`/`comment_rate` stay `None` when the
//! platform hides the underlying count. Every other field defaults to 0
//! when its inputs are missing — these functions never error.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::EnrichedVideo;

/// Ratios derived from one enriched video, inputs to every feature scorer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    pub age_hours: f64,
    pub views_per_hour: f64,
    pub like_rate: Option<f64>,
    pub comment_rate: Option<f64>,
    pub views_per_sub: f64,
    pub duration_sec: u64,
    pub views: u64,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub subs: u64,
}

static RE_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration regex"));

static RE_VIEWS_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)views?").expect("views regex"));

static RE_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([\d.,]+)\s*([KMB])?").expect("count regex"));

/// Parse an ISO 8601 duration to seconds.
/// `"PT12M34S"` → 754, `"PT1H2M3S"` → 3723, empty or garbage → 0.
pub fn parse_iso8601_duration(s: &str) -> u64 {
    let Some(caps) = RE_DURATION.captures(s) else {
        return 0;
    };
    let num = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    num(1) * 3600 + num(2) * 60 + num(3)
}

/// Parse a human view-count string to a number (fallback when the API fails).
/// `"1.2M views"` → 1_200_000, `"456K views"` → 456_000.
pub fn parse_view_count_text(text: &str) -> u64 {
    let cleaned = RE_VIEWS_WORD.replace_all(text, "");
    let cleaned = cleaned.trim();
    let Some(caps) = RE_COUNT.captures(cleaned) else {
        return 0;
    };
    let num: f64 = caps[1].replace(',', "").parse().unwrap_or(0.0);
    let mult = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(s) if s == "K" => 1_000.0,
        Some(s) if s == "M" => 1_000_000.0,
        Some(s) if s == "B" => 1_000_000_000.0,
        _ => 1.0,
    };
    (num * mult).round().max(0.0) as u64
}

/// Hours elapsed since publish, clamped to ≥0; 0 on missing/unparseable input.
pub fn age_hours_at(published_at: &str, now: DateTime<Utc>) -> f64 {
    if published_at.is_empty() {
        return 0.0;
    }
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(dt) => {
            let ms = (now - dt.with_timezone(&Utc)).num_milliseconds() as f64;
            (ms / 3_600_000.0).max(0.0)
        }
        Err(_) => 0.0,
    }
}

/// Wall-clock wrapper around [`age_hours_at`].
pub fn age_hours(published_at: &str) -> f64 {
    age_hours_at(published_at, Utc::now())
}

/// View velocity; 0 when the age is unknown or non-positive.
pub fn views_per_hour(views: u64, age_hours: f64) -> f64 {
    if age_hours <= 0.0 {
        return 0.0;
    }
    views as f64 / age_hours
}

/// Likes per view. Zero-view videos rate 0; hidden like counts stay `None`.
pub fn like_rate(likes: Option<u64>, views: u64) -> Option<f64> {
    if views == 0 {
        return Some(0.0);
    }
    likes.map(|l| l as f64 / views as f64)
}

/// Comments per view, same contract as [`like_rate`].
pub fn comment_rate(comments: Option<u64>, views: u64) -> Option<f64> {
    if views == 0 {
        return Some(0.0);
    }
    comments.map(|c| c as f64 / views as f64)
}

/// Views-per-subscriber ratio; 0 when the channel size is unknown or zero.
pub fn views_per_sub(views: u64, subs: u64) -> f64 {
    if subs == 0 {
        return 0.0;
    }
    views as f64 / subs as f64
}

/// Assemble all derived metrics for one enriched video at a fixed `now`.
pub fn compute_derived_metrics_at(video: &EnrichedVideo, now: DateTime<Utc>) -> DerivedMetrics {
    let views = video.stats.as_ref().map(|s| s.views).unwrap_or(0);
    let likes = video.stats.as_ref().and_then(|s| s.likes);
    let comments = video.stats.as_ref().and_then(|s| s.comments);
    let published_at = video
        .stats
        .as_ref()
        .map(|s| s.published_at.as_str())
        .unwrap_or("");
    let duration_sec = video.stats.as_ref().map(|s| s.duration_sec).unwrap_or(0);
    let subs = video.channel.as_ref().map(|c| c.subs).unwrap_or(0);

    let age = age_hours_at(published_at, now);

    DerivedMetrics {
        age_hours: age,
        views_per_hour: views_per_hour(views, age),
        like_rate: like_rate(likes, views),
        comment_rate: comment_rate(comments, views),
        views_per_sub: views_per_sub(views, subs),
        duration_sec,
        views,
        likes,
        comments,
        subs,
    }
}

/// Wall-clock wrapper around [`compute_derived_metrics_at`].
pub fn compute_derived_metrics(video: &EnrichedVideo) -> DerivedMetrics {
    compute_derived_metrics_at(video, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelStats, VideoSeed, VideoStats};
    use chrono::TimeZone;

    fn seed() -> VideoSeed {
        VideoSeed {
            video_id: "v1".into(),
            title: "A title".into(),
            channel_id: "c1".into(),
            channel_name: "Channel".into(),
            thumbnail_url: String::new(),
            duration_text: String::new(),
            published_time_text: String::new(),
            view_count_text: String::new(),
            href: String::new(),
            rank: 1,
        }
    }

    #[test]
    fn iso8601_durations() {
        assert_eq!(parse_iso8601_duration("PT12M34S"), 754);
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("garbage"), 0);
    }

    #[test]
    fn view_count_text_suffixes() {
        assert_eq!(parse_view_count_text("1.2M views"), 1_200_000);
        assert_eq!(parse_view_count_text("456K views"), 456_000);
        assert_eq!(parse_view_count_text("1,234 views"), 1234);
        assert_eq!(parse_view_count_text("2B views"), 2_000_000_000);
        assert_eq!(parse_view_count_text(""), 0);
        assert_eq!(parse_view_count_text("no numbers"), 0);
    }

    #[test]
    fn age_clamps_and_tolerates_garbage() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let day_before = "2024-06-01T00:00:00Z";
        assert!((age_hours_at(day_before, now) - 24.0).abs() < 1e-9);
        // Published "in the future" clamps to zero rather than going negative.
        assert_eq!(age_hours_at("2024-06-03T00:00:00Z", now), 0.0);
        assert_eq!(age_hours_at("not a date", now), 0.0);
        assert_eq!(age_hours_at("", now), 0.0);
    }

    #[test]
    fn rates_keep_hidden_counts_distinct_from_zero() {
        assert_eq!(like_rate(None, 1000), None);
        assert_eq!(like_rate(Some(50), 1000), Some(0.05));
        // Zero views short-circuits before the hidden check.
        assert_eq!(like_rate(None, 0), Some(0.0));
        assert_eq!(comment_rate(None, 500), None);
        assert_eq!(comment_rate(Some(5), 500), Some(0.01));
    }

    #[test]
    fn velocity_and_viral_guards() {
        assert_eq!(views_per_hour(100, 0.0), 0.0);
        assert_eq!(views_per_hour(100, 4.0), 25.0);
        assert_eq!(views_per_sub(100, 0), 0.0);
        assert_eq!(views_per_sub(100, 50), 2.0);
    }

    #[test]
    fn derived_metrics_default_to_zero_without_data() {
        let video = EnrichedVideo {
            seed: seed(),
            stats: None,
            channel: None,
        };
        let m = compute_derived_metrics_at(&video, Utc::now());
        assert_eq!(m.age_hours, 0.0);
        assert_eq!(m.views_per_hour, 0.0);
        // No stats at all means zero views, so the rates collapse to 0.
        assert_eq!(m.like_rate, Some(0.0));
        assert_eq!(m.views, 0);
        assert_eq!(m.subs, 0);
    }

    #[test]
    fn derived_metrics_from_full_data() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let video = EnrichedVideo {
            seed: seed(),
            stats: Some(VideoStats {
                views: 24_000,
                likes: Some(1200),
                comments: None,
                published_at: "2024-06-01T00:00:00Z".into(),
                duration_sec: 754,
                description: String::new(),
                tags: vec![],
                category_id: String::new(),
                topic_categories: vec![],
            }),
            channel: Some(ChannelStats {
                subs: 12_000,
                channel_created_at: String::new(),
                total_views: 0,
                video_count: 0,
            }),
        };
        let m = compute_derived_metrics_at(&video, now);
        assert!((m.views_per_hour - 1000.0).abs() < 1e-9);
        assert_eq!(m.like_rate, Some(0.05));
        assert_eq!(m.comment_rate, None);
        assert_eq!(m.views_per_sub, 2.0);
        assert_eq!(m.duration_sec, 754);
    }
}
