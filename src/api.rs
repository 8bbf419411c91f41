// src/api.rs
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::discovery;
use crate::enrich;
use crate::providers::{ChannelStatsProvider, SearchProvider, VideoStatsProvider};
use crate::scoring::{self, bias_level, ScoringPolicy};
use crate::types::{ScoredVideo, SilencedCandidate, ThumbFeatures, VideoSeed};

/// Policy file read at startup and on admin reload.
pub const POLICY_PATH: &str = "scoring_policy.json";

#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoStatsProvider>,
    pub channels: Arc<dyn ChannelStatsProvider>,
    pub search: Arc<dyn SearchProvider>,
    pub policy: Arc<RwLock<ScoringPolicy>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze_feed))
        .route("/silenced", post(discover_silenced))
        .route("/debug/policy", get(debug_policy))
        .route("/admin/reload-policy", get(admin_reload_policy))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeReq {
    seeds: Vec<VideoSeed>,
    /// Thumbnail feature vectors keyed by video ID, computed client-side.
    #[serde(default)]
    thumbnails: HashMap<String, ThumbFeatures>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResp {
    videos: Vec<ScoredVideo>,
    summary: FeedSummary,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedSummary {
    count: usize,
    avg_bias_score: u8,
    /// Videos per bias level, keyed by the level's display label.
    levels: HashMap<String, usize>,
}

impl FeedSummary {
    fn from_scored(videos: &[ScoredVideo]) -> Self {
        let count = videos.len();
        let avg = if count == 0 {
            0
        } else {
            let sum: u32 = videos.iter().map(|v| v.bias_score as u32).sum();
            (sum as f64 / count as f64).round() as u8
        };
        let mut levels: HashMap<String, usize> = HashMap::new();
        for v in videos {
            *levels
                .entry(bias_level(v.bias_score).to_string())
                .or_insert(0) += 1;
        }
        FeedSummary {
            count,
            avg_bias_score: avg,
            levels,
        }
    }
}

async fn analyze_feed(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Json<AnalyzeResp> {
    let enriched =
        enrich::enrich_seeds(&body.seeds, state.videos.as_ref(), state.channels.as_ref()).await;
    let policy = {
        let guard = state.policy.read().expect("rwlock poisoned");
        guard.clone()
    };
    let videos = scoring::score_videos(&enriched, &body.thumbnails, &policy);
    let summary = FeedSummary::from_scored(&videos);
    Json(AnalyzeResp { videos, summary })
}

async fn discover_silenced(
    State(state): State<AppState>,
    Json(scored): Json<Vec<ScoredVideo>>,
) -> Json<Vec<SilencedCandidate>> {
    let picks = discovery::find_silenced_videos(
        &scored,
        state.search.as_ref(),
        state.videos.as_ref(),
        state.channels.as_ref(),
    )
    .await;
    Json(picks)
}

async fn debug_policy(State(state): State<AppState>) -> Json<ScoringPolicy> {
    let guard = state.policy.read().expect("rwlock poisoned");
    Json(guard.clone())
}

async fn admin_reload_policy(State(state): State<AppState>) -> String {
    let fresh = ScoringPolicy::load_from_file(POLICY_PATH);
    match state.policy.write() {
        Ok(mut p) => {
            *p = fresh;
            "reloaded".to_string()
        }
        Err(_) => "failed: lock poisoned".to_string(),
    }
}
