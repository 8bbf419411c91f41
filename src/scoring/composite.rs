// src/scoring/composite.rs
//! # Composite Scorer
//! Pure, testable logic that folds the six feature sub-scores into one
//! 0..100 bias score per video, applies the display-tier policy, and builds
//! the human-readable breakdown. No I/O.
//!
//! `BiasScore = 100 * (0.25*EA + 0.25*CM + 0.25*RP + 0.10*EN + 0.10*TR + 0.05*CI)`,
//! then tier adjustment and flat bonuses from [`ScoringPolicy`].
//!
//! The tier jitter is the one intentional source of run-to-run variance in
//! the pipeline: scores move within each tier's stated band between runs.
//! The RNG is a parameter so tests pin it and verify the bands exactly.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::derived::{compute_derived_metrics_at, DerivedMetrics};
use crate::scoring::features;
use crate::scoring::policy::ScoringPolicy;
use crate::stats::compute_global_stats_at;
use crate::types::{Breakdown, DisplayMetrics, EnrichedVideo, ScoredVideo, ThumbFeatures};

/// Composite weights over the six feature groups.
const W_EA: f64 = 0.25;
const W_CM: f64 = 0.25;
const W_RP: f64 = 0.25;
const W_EN: f64 = 0.10;
const W_TR: f64 = 0.10;
const W_CI: f64 = 0.05;

/// Score a batch with an explicit RNG and clock. Order-preserving relative
/// to the input; global stats are computed once and shared read-only across
/// every per-video call.
pub fn score_videos_with_rng<R: Rng + ?Sized>(
    videos: &[EnrichedVideo],
    thumb_features: &HashMap<String, ThumbFeatures>,
    policy: &ScoringPolicy,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<ScoredVideo> {
    if videos.is_empty() {
        return Vec::new();
    }

    tracing::debug!(count = videos.len(), "scoring batch");
    let global = compute_global_stats_at(videos, now);
    let global = global.as_ref();

    videos
        .iter()
        .map(|video| {
            let m = compute_derived_metrics_at(video, now);
            let thumb = thumb_features.get(&video.seed.video_id);

            let ea = features::exposure_advantage(video, &m, global);
            let cm = features::click_magnet(video, thumb);
            let rp = features::retention_proxy(&m, global);
            let en = features::engagement(&m, global);
            let tr = features::topic_reinforcement(video, videos);
            let ci = features::commercial_influence(video);

            let base =
                100.0 * (W_EA * ea + W_CM * cm + W_RP * rp + W_EN * en + W_TR * tr + W_CI * ci);

            let mut adjusted = match policy.tier_for(m.subs) {
                Some(tier) => tier.apply(base, rng),
                None => base,
            };

            let description = video
                .stats
                .as_ref()
                .map(|s| s.description.as_str())
                .unwrap_or("");
            if features::has_sponsor_signal(description) {
                adjusted += policy.sponsor_bonus;
            }
            if cm > policy.clickbait_bonus_threshold {
                adjusted += policy.clickbait_bonus;
            }

            let bias_score = adjusted.clamp(0.0, 100.0).round() as u8;
            let confidence = compute_confidence(video, &m, thumb);

            ScoredVideo {
                video: video.clone(),
                bias_score,
                confidence,
                breakdown: Breakdown {
                    ea: (ea * 100.0).round() as u8,
                    cm: (cm * 100.0).round() as u8,
                    rp: (rp * 100.0).round() as u8,
                    en: (en * 100.0).round() as u8,
                    tr: (tr * 100.0).round() as u8,
                    ci: (ci * 100.0).round() as u8,
                },
                metrics: build_display_metrics(video, &m, thumb),
            }
        })
        .collect()
}

/// Production entrypoint: wall clock and thread RNG.
pub fn score_videos(
    videos: &[EnrichedVideo],
    thumb_features: &HashMap<String, ThumbFeatures>,
    policy: &ScoringPolicy,
) -> Vec<ScoredVideo> {
    let mut rng = rand::rng();
    score_videos_with_rng(videos, thumb_features, policy, &mut rng, Utc::now())
}

/// Data-completeness confidence, 0..100. Each missing upstream piece docks
/// points; the item itself never fails.
fn compute_confidence(
    video: &EnrichedVideo,
    m: &DerivedMetrics,
    thumb: Option<&ThumbFeatures>,
) -> u8 {
    let mut score: i32 = 100;

    match &video.stats {
        None => score -= 30,
        Some(s) => {
            if s.likes.is_none() {
                score -= 10;
            }
            if s.comments.is_none() {
                score -= 10;
            }
        }
    }

    if video.channel.is_none() {
        score -= 20;
    }

    if thumb.map(|t| t.error).unwrap_or(true) {
        score -= 15;
    }

    // Very new (or unknown-age) videos have less reliable metrics.
    if m.age_hours < 6.0 {
        score -= 15;
    }

    score.max(0) as u8
}

/// Qualitative label for a bias score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BiasLevel {
    High,
    Moderate,
    Low,
    Minimal,
}

impl std::fmt::Display for BiasLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BiasLevel::High => "High",
            BiasLevel::Moderate => "Moderate",
            BiasLevel::Low => "Low",
            BiasLevel::Minimal => "Minimal",
        };
        f.write_str(s)
    }
}

/// 80+ High, 50+ Moderate, 10+ Low, else Minimal.
pub fn bias_level(score: u8) -> BiasLevel {
    match score {
        80.. => BiasLevel::High,
        50.. => BiasLevel::Moderate,
        10.. => BiasLevel::Low,
        _ => BiasLevel::Minimal,
    }
}

/// The single factor that contributes most to a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DominantFactor {
    pub name: &'static str,
    pub value: u8,
}

/// Argmax over the six factors; ties resolve in the fixed enumeration order
/// EA, CM, RP, EN, TR, CI (first wins).
pub fn dominant_factor(breakdown: &Breakdown) -> DominantFactor {
    let factors = [
        ("Exposure", breakdown.ea),
        ("Clickbait", breakdown.cm),
        ("Retention", breakdown.rp),
        ("Engagement", breakdown.en),
        ("Topic", breakdown.tr),
        ("Commercial", breakdown.ci),
    ];

    let mut best = factors[0];
    for f in factors.into_iter().skip(1) {
        if f.1 > best.1 {
            best = f;
        }
    }
    DominantFactor {
        name: best.0,
        value: best.1,
    }
}

fn build_display_metrics(
    video: &EnrichedVideo,
    m: &DerivedMetrics,
    thumb: Option<&ThumbFeatures>,
) -> DisplayMetrics {
    DisplayMetrics {
        views: m.views,
        subs: m.subs,
        age: format_age(m.age_hours),
        velocity: format_velocity(m.views, m.age_hours),
        thumb_abuse: thumb_assessment(m.subs, thumb),
        title_bait: title_assessment(&video.seed.title),
    }
}

/// Readable age: "38m ago", "5h ago", "3d ago", "2w ago", "4mo ago", "1y ago".
pub fn format_age(age_hours: f64) -> Option<String> {
    if age_hours <= 0.0 {
        return None;
    }
    let s = if age_hours < 1.0 {
        format!("{}m ago", (age_hours * 60.0).round() as u64)
    } else if age_hours < 24.0 {
        format!("{}h ago", age_hours.round() as u64)
    } else if age_hours < 168.0 {
        format!("{}d ago", (age_hours / 24.0).round() as u64)
    } else if age_hours < 720.0 {
        format!("{}w ago", (age_hours / 168.0).round() as u64)
    } else if age_hours < 8760.0 {
        format!("{}mo ago", (age_hours / 720.0).round() as u64)
    } else {
        format!("{}y ago", (age_hours / 8760.0).round() as u64)
    };
    Some(s)
}

/// Views per day for the popover, e.g. "1.2M/d", "3.4K/d", "87/d".
pub fn format_velocity(views: u64, age_hours: f64) -> Option<String> {
    if views == 0 || age_hours <= 0.0 {
        return None;
    }
    let days = (age_hours / 24.0).max(1.0);
    let velocity = (views as f64 / days).round() as u64;

    let s = if velocity >= 1_000_000 {
        format!("{:.1}M/d", velocity as f64 / 1_000_000.0)
    } else if velocity >= 1_000 {
        format!("{:.1}K/d", velocity as f64 / 1_000.0)
    } else {
        format!("{velocity}/d")
    };
    Some(s)
}

/// Thumbnail label keyed by channel size and visual-signal strength.
/// Small channels get no label at all.
pub fn thumb_assessment(subs: u64, thumb: Option<&ThumbFeatures>) -> Option<String> {
    if subs == 0 {
        return None;
    }

    let t = thumb.copied().unwrap_or_else(ThumbFeatures::defaults);
    let high_signals = t.saturation > 0.6 || t.contrast > 0.6 || t.red_dominance > 0.5;

    let label = if subs >= 5_000_000 {
        Some(if high_signals { "Optimized" } else { "Pro" })
    } else if subs >= 1_000_000 {
        Some(if high_signals { "Enhanced" } else { "Standard" })
    } else if subs >= 100_000 {
        if high_signals {
            Some("Tuned")
        } else {
            None
        }
    } else {
        None
    };

    label.map(str::to_string)
}

/// Clickbait label for the title: caps abuse beats punctuation beats
/// pattern matches.
pub fn title_assessment(title: &str) -> Option<String> {
    if title.is_empty() {
        return None;
    }

    let letters = title.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let caps = title.chars().filter(|c| c.is_ascii_uppercase()).count();
    if letters > 0 && caps as f64 / letters as f64 > 0.5 {
        return Some("CAPS Heavy".to_string());
    }

    if title.contains("!!") || title.contains("??") {
        return Some("Sensational".to_string());
    }

    if features::CLICKBAIT_PATTERNS.iter().any(|p| p.is_match(title)) {
        return Some("Bait Phrase".to_string());
    }

    None
}
