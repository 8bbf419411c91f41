// src/types.rs
//! Value records shared across the scoring and discovery pipeline.
//!
//! Everything here is plain data: no back-references, no interior mutability.
//! A scored batch is produced in one pass and never mutated afterwards; a
//! fresh pass recomputes from scratch. Field names serialize in the
//! camelCase shape the browser extension already speaks.

use serde::{Deserialize, Serialize};

/// One homepage tile as captured by the extraction collaborator.
/// `rank` is the 1-based position in source order; immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSeed {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// e.g. "12:34"
    #[serde(default)]
    pub duration_text: String,
    /// e.g. "2 days ago"
    #[serde(default)]
    pub published_time_text: String,
    /// e.g. "1.2M views" — fallback source when the stats API fails.
    #[serde(default)]
    pub view_count_text: String,
    #[serde(default)]
    pub href: String,
    pub rank: u32,
}

/// Per-video statistics from the data API.
/// `likes`/`comments` are `None` when the platform hides them — that is not
/// the same as zero, and the distinction propagates downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub views: u64,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    /// RFC 3339 timestamp as returned by the API; empty when unknown.
    #[serde(default)]
    pub published_at: String,
    pub duration_sec: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub topic_categories: Vec<String>,
}

/// Channel-level statistics from the data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub subs: u64,
    #[serde(default)]
    pub channel_created_at: String,
    pub total_views: u64,
    pub video_count: u64,
}

/// A seed joined with whatever the two stats providers returned for it.
/// Missing provider entries stay `None`; downstream formulas degrade per
/// their documented defaults instead of erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVideo {
    #[serde(flatten)]
    pub seed: VideoSeed,
    pub stats: Option<VideoStats>,
    pub channel: Option<ChannelStats>,
}

/// Thumbnail feature vector, produced by the pixel-analysis collaborator.
/// The core never computes these itself; it only consumes a map of them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbFeatures {
    pub saturation: f64,
    pub contrast: f64,
    pub red_dominance: f64,
    pub edge_density: f64,
    /// Set when the provider failed and shipped defaults instead.
    #[serde(default)]
    pub error: bool,
}

impl ThumbFeatures {
    /// Neutral defaults used when no features arrived for a video.
    pub fn defaults() -> Self {
        Self {
            saturation: 0.5,
            contrast: 0.5,
            red_dominance: 0.3,
            edge_density: 0.3,
            error: false,
        }
    }
}

/// Per-factor sub-scores, each scaled to 0..100 for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Breakdown {
    pub ea: u8,
    pub cm: u8,
    pub rp: u8,
    pub en: u8,
    pub tr: u8,
    pub ci: u8,
}

/// Human-readable metrics for the hover popover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetrics {
    pub views: u64,
    pub subs: u64,
    /// e.g. "3h ago", "2d ago"; `None` when age is unknown.
    pub age: Option<String>,
    /// Views per day, e.g. "1.2K/d".
    pub velocity: Option<String>,
    /// e.g. "Optimized", "Enhanced"; `None` for small channels.
    pub thumb_abuse: Option<String>,
    /// e.g. "CAPS Heavy", "Bait Phrase".
    pub title_bait: Option<String>,
}

/// Output of one scoring pass for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredVideo {
    #[serde(flatten)]
    pub video: EnrichedVideo,
    /// Composite bias score, integer 0..100.
    pub bias_score: u8,
    /// Data-completeness confidence, integer 0..100.
    pub confidence: u8,
    pub breakdown: Breakdown,
    pub metrics: DisplayMetrics,
}

/// Candidate stub returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStub {
    pub video_id: String,
    pub title: String,
    pub channel_id: String,
    pub channel_name: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub published_at: String,
}

/// A search stub joined with its enrichment data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateVideo {
    #[serde(flatten)]
    pub stub: SearchStub,
    pub stats: Option<VideoStats>,
    pub channel: Option<ChannelStats>,
}

/// Why the discovery engine considers a pick under-exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhySilenced {
    pub subs: u64,
    pub views: u64,
    /// Like rate as a percentage rounded to two decimals; `None` when hidden.
    pub like_rate_pct: Option<f64>,
    pub duration_min: u64,
}

/// The under-exposed counterpart discovered for one noise video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SilencedCandidate {
    pub noise_video_id: String,
    pub silenced_video: CandidateVideo,
    pub why_silenced: WhySilenced,
    pub quality_score: u8,
    pub query: String,
    pub candidate_count: usize,
}
