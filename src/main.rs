//! Bias Lens — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bias_lens::api::{self, AppState, POLICY_PATH};
use bias_lens::providers::youtube::YouTubeDataApi;
use bias_lens::scoring::ScoringPolicy;
use bias_lens::telemetry::Telemetry;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bias_lens=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let api_key = std::env::var("YOUTUBE_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("YOUTUBE_API_KEY not set; provider calls will fail and scores will degrade");
    }
    let yt = Arc::new(YouTubeDataApi::new(api_key));

    let telemetry = Telemetry::init();
    let policy = ScoringPolicy::load_from_file(POLICY_PATH);
    tracing::info!(tiers = policy.tiers.len(), "scoring policy loaded");

    let state = AppState {
        videos: yt.clone(),
        channels: yt.clone(),
        search: yt,
        policy: Arc::new(RwLock::new(policy)),
    };
    let app = api::create_router(state).merge(telemetry.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
