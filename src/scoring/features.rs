// src/scoring/features.rs
//! The six independent feature scorers. Each maps one video (plus its
//! derived metrics and the read-only batch context) to a 0..1 sub-score for
//! a single bias dimension. All of them are pure: identical inputs yield
//! identical outputs — the only intentional randomness in the pipeline lives
//! in the composite tier adjustment, not here.
//!
//! The clickbait and sponsor pattern tables are fixed literal sets; scoring
//! stability across deployments depends on them not drifting.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::derived::DerivedMetrics;
use crate::keywords;
use crate::stats::GlobalStats;
use crate::types::{EnrichedVideo, ThumbFeatures};

/// Clickbait title signals: phrase matches, punctuation repetition,
/// sensational emoji.
pub static CLICKBAIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)you won'?t believe",
        r"(?i)shocking",
        r"(?i)insane",
        r"(?i)destroyed",
        r"(?i)exposed",
        r"(?i)gone wrong",
        r"(?i)what happens",
        r"(?i)this is why",
        r"(?i)the truth about",
        r"\?\?+",
        r"!!+",
        r"😱|🤯|😭|🔥|💀",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("clickbait pattern"))
    .collect()
});

/// Sponsor / commercial signals in video descriptions.
pub static SPONSOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)sponsored by",
        r"(?i)thanks to .+ for sponsoring",
        r"(?i)use code",
        r"(?i)promo code",
        r"(?i)affiliate link",
        r"(?i)check out .+ at",
        r"(?i)shop\.app",
        r"(?i)amzn\.to",
        r"(?i)bit\.ly",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("sponsor pattern"))
    .collect()
});

static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://").expect("link regex"));

/// Exposure Advantage: how much algorithmic placement this video enjoys.
/// `0.3*rank + 0.3*velocity + 0.25*authority + 0.15*fresh`.
pub fn exposure_advantage(
    video: &EnrichedVideo,
    m: &DerivedMetrics,
    global: Option<&GlobalStats>,
) -> f64 {
    // Rank 1 -> 1.0, rank 20 -> 0.05.
    let rank_score = (1.0 - (video.seed.rank.saturating_sub(1)) as f64 / 20.0).max(0.05);

    let velocity_score = match global {
        Some(g) if g.views_per_hour.p95 > 0.0 => (m.views_per_hour / g.views_per_hour.p95).min(1.0),
        _ => 0.5,
    };

    let authority_score = match global {
        Some(g) if g.subs.p95 > 0.0 => (m.subs as f64 / g.subs.p95).min(1.0),
        _ => 0.5,
    };

    // 24h old -> 1.0, one week -> ~0.14; unknown age -> neutral.
    let fresh_score = if m.age_hours > 0.0 {
        (24.0 / m.age_hours).min(1.0)
    } else {
        0.5
    };

    0.3 * rank_score + 0.3 * velocity_score + 0.25 * authority_score + 0.15 * fresh_score
}

/// Click Magnet: clickbait signals in the title plus thumbnail aggression.
/// `0.4*title + 0.6*thumb`.
pub fn click_magnet(video: &EnrichedVideo, thumb: Option<&ThumbFeatures>) -> f64 {
    let title = video.seed.title.as_str();

    let bait_hits = CLICKBAIT_PATTERNS.iter().filter(|p| p.is_match(title)).count();
    let title_bait_score = (bait_hits as f64 / 3.0).min(1.0);

    let total_chars = title.chars().count();
    let caps_count = title.chars().filter(|c| c.is_ascii_uppercase()).count();
    let caps_ratio = if total_chars > 0 {
        caps_count as f64 / total_chars as f64
    } else {
        0.0
    };
    let caps_score = (caps_ratio * 2.0).min(1.0);

    let t = thumb.copied().unwrap_or_else(ThumbFeatures::defaults);
    let thumb_score =
        0.3 * t.saturation + 0.25 * t.contrast + 0.25 * t.red_dominance + 0.2 * t.edge_density;

    let title_score = 0.6 * title_bait_score + 0.4 * caps_score;
    0.4 * title_score + 0.6 * thumb_score
}

/// Retention Proxy: satisfaction (like rate) blended with view velocity.
/// `0.6*satisfaction + 0.4*velocity`.
pub fn retention_proxy(m: &DerivedMetrics, global: Option<&GlobalStats>) -> f64 {
    // Hidden like counts get a conservative stand-in, not zero.
    let like_rate = m.like_rate.unwrap_or(0.03);
    let like_p95 = global
        .map(|g| g.like_rate.p95)
        .filter(|p| *p > 0.0)
        .unwrap_or(0.05);
    let satisfaction_score = (like_rate / like_p95).min(1.0);

    let velocity_p95 = global
        .map(|g| g.views_per_hour.p95)
        .filter(|p| *p > 0.0)
        .unwrap_or(1000.0);
    let velocity_score = (m.views_per_hour / velocity_p95).min(1.0);

    0.6 * satisfaction_score + 0.4 * velocity_score
}

/// Engagement: like and comment rates normalized against the batch p95.
/// `0.6*like + 0.4*comment`; hidden rates count as zero here.
pub fn engagement(m: &DerivedMetrics, global: Option<&GlobalStats>) -> f64 {
    let like_rate = m.like_rate.unwrap_or(0.0);
    let like_p95 = global
        .map(|g| g.like_rate.p95)
        .filter(|p| *p > 0.0)
        .unwrap_or(0.05);
    let like_score = (like_rate / like_p95).min(1.0);

    let comment_rate = m.comment_rate.unwrap_or(0.0);
    let comment_p95 = global
        .map(|g| g.comment_rate.p95)
        .filter(|p| *p > 0.0)
        .unwrap_or(0.005);
    let comment_score = (comment_rate / comment_p95).min(1.0);

    0.6 * like_score + 0.4 * comment_score
}

/// Topic Reinforcement: how much of the batch echoes this video's topic.
/// Fraction of *other* videos sharing ≥2 title keywords (length > 3),
/// normalized so that half the feed sharing the topic scores 1.0.
pub fn topic_reinforcement(video: &EnrichedVideo, batch: &[EnrichedVideo]) -> f64 {
    if batch.is_empty() {
        return 0.5;
    }

    let words: Vec<String> = keywords::tokenize(&video.seed.title)
        .into_iter()
        .filter(|w| w.chars().count() > 3)
        .collect();

    let mut overlap = 0usize;
    for other in batch {
        if other.seed.video_id == video.seed.video_id {
            continue;
        }
        let other_tokens = keywords::tokenize(&other.seed.title);
        let shared = words
            .iter()
            .filter(|w| other_tokens.contains(w))
            .collect::<std::collections::HashSet<_>>()
            .len();
        if shared >= 2 {
            overlap += 1;
        }
    }

    (overlap as f64 / (batch.len() as f64 / 2.0)).min(1.0)
}

/// Commercial Influence: sponsor phrases and link density in the description.
/// `0.6*sponsor + 0.4*links`; no description means 0 on both.
pub fn commercial_influence(video: &EnrichedVideo) -> f64 {
    let description = video
        .stats
        .as_ref()
        .map(|s| s.description.as_str())
        .unwrap_or("");

    let sponsor_hits = SPONSOR_PATTERNS
        .iter()
        .filter(|p| p.is_match(description))
        .count();
    let sponsor_score = (sponsor_hits as f64 / 2.0).min(1.0);

    let link_count = RE_LINK.find_iter(description).count();
    let link_score = (link_count as f64 / 5.0).min(1.0);

    0.6 * sponsor_score + 0.4 * link_score
}

/// True when the description trips any sponsor pattern (used by the
/// composite scorer's flat bonus).
pub fn has_sponsor_signal(description: &str) -> bool {
    SPONSOR_PATTERNS.iter().any(|p| p.is_match(description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::compute_derived_metrics_at;
    use crate::stats::compute_global_stats_at;
    use crate::types::{ChannelStats, VideoSeed, VideoStats};
    use chrono::{TimeZone, Utc};

    fn video(id: &str, title: &str, rank: u32) -> EnrichedVideo {
        EnrichedVideo {
            seed: VideoSeed {
                video_id: id.into(),
                title: title.into(),
                channel_id: format!("ch-{id}"),
                channel_name: "Channel".into(),
                thumbnail_url: String::new(),
                duration_text: String::new(),
                published_time_text: String::new(),
                view_count_text: String::new(),
                href: String::new(),
                rank,
            },
            stats: None,
            channel: None,
        }
    }

    fn stats(views: u64, likes: Option<u64>, comments: Option<u64>) -> VideoStats {
        VideoStats {
            views,
            likes,
            comments,
            published_at: "2024-06-01T00:00:00Z".into(),
            duration_sec: 600,
            description: String::new(),
            tags: vec![],
            category_id: String::new(),
            topic_categories: vec![],
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn all_scorers_stay_in_unit_range() {
        let mut v = video("a", "SHOCKING!! You won't believe THIS 🔥", 1);
        v.stats = Some(stats(100_000, Some(9000), Some(400)));
        v.channel = Some(ChannelStats {
            subs: 2_000_000,
            channel_created_at: String::new(),
            total_views: 0,
            video_count: 0,
        });
        let batch = vec![v.clone(), video("b", "calm gardening tips", 2)];
        let global = compute_global_stats_at(&batch, now());
        let m = compute_derived_metrics_at(&v, now());

        for score in [
            exposure_advantage(&v, &m, global.as_ref()),
            click_magnet(&v, None),
            retention_proxy(&m, global.as_ref()),
            engagement(&m, global.as_ref()),
            topic_reinforcement(&v, &batch),
            commercial_influence(&v),
        ] {
            assert!((0.0..=1.0).contains(&score), "out of range: {score}");
        }
    }

    #[test]
    fn ea_rank_term_tops_out_at_rank_one() {
        let v = video("a", "t", 1);
        let m = DerivedMetrics {
            age_hours: 24.0,
            ..Default::default()
        };
        // rank 1.0, velocity 0.5 (no stats), authority 0.5, fresh 1.0
        let ea = exposure_advantage(&v, &m, None);
        assert!((ea - (0.3 + 0.15 + 0.125 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn ea_rank_floor_at_deep_ranks() {
        let v = video("a", "t", 40);
        let m = DerivedMetrics::default();
        let ea = exposure_advantage(&v, &m, None);
        // rank term floored at 0.05; everything else neutral defaults.
        assert!((ea - (0.3 * 0.05 + 0.3 * 0.5 + 0.25 * 0.5 + 0.15 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn clickbait_title_pushes_cm_past_half() {
        let v = video("a", "You WON'T believe THIS!!", 1);
        let cm = click_magnet(&v, None);
        assert!(cm > 0.5, "cm = {cm}");
    }

    #[test]
    fn plain_title_with_default_thumb_stays_low() {
        let v = video("a", "a quiet afternoon of pottery", 10);
        let cm = click_magnet(&v, None);
        assert!(cm < 0.5, "cm = {cm}");
    }

    #[test]
    fn hidden_like_rate_uses_standin_in_rp() {
        let m = DerivedMetrics {
            like_rate: None,
            ..Default::default()
        };
        // 0.03 / 0.05 = 0.6 satisfaction, zero velocity.
        let rp = retention_proxy(&m, None);
        assert!((rp - 0.6 * 0.6).abs() < 1e-9);
    }

    #[test]
    fn hidden_rates_count_as_zero_in_engagement() {
        let m = DerivedMetrics {
            like_rate: None,
            comment_rate: None,
            ..Default::default()
        };
        assert_eq!(engagement(&m, None), 0.0);
    }

    #[test]
    fn topic_reinforcement_saturates_at_half_the_feed() {
        // 12 videos; 6 others share >= 2 keywords with the target.
        let target = video("t", "rust async runtime deep dive", 1);
        let mut batch = vec![target.clone()];
        for i in 0..6 {
            batch.push(video(
                &format!("s{i}"),
                "async runtime internals explained",
                2,
            ));
        }
        for i in 0..5 {
            batch.push(video(&format!("u{i}"), "cooking pasta from scratch", 3));
        }
        let tr = topic_reinforcement(&target, &batch);
        // min(1, 6 / (12/2)) = 1.0
        assert!((tr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn topic_reinforcement_neutral_on_empty_batch() {
        let v = video("a", "anything at all", 1);
        assert_eq!(topic_reinforcement(&v, &[]), 0.5);
    }

    #[test]
    fn commercial_influence_counts_sponsors_and_links() {
        let mut v = video("a", "t", 1);
        let mut s = stats(1000, Some(10), Some(1));
        s.description =
            "Sponsored by Acme. Use code BIAS10 at https://example.com and https://amzn.to/x"
                .into();
        v.stats = Some(s);
        let ci = commercial_influence(&v);
        // 3 sponsor hits -> sponsor term saturates at 1.0; 2 links -> 0.4.
        assert!((ci - (0.6 + 0.4 * 0.4)).abs() < 1e-9);
        assert!(has_sponsor_signal("please use code XYZ"));
        assert!(!has_sponsor_signal("no commercial text here"));
    }

    #[test]
    fn missing_description_scores_zero_ci() {
        let v = video("a", "t", 1);
        assert_eq!(commercial_influence(&v), 0.0);
    }
}
