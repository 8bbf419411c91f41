// src/telemetry.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("enrich_batches_total", "Seed batches enriched.");
        describe_counter!(
            "enrich_missing_stats_total",
            "Seeds with no stats entry after enrichment."
        );
        describe_counter!("provider_errors_total", "Provider fetch/parse errors.");
        describe_counter!(
            "discovery_attempts_total",
            "Noise videos sent through silenced discovery."
        );
        describe_counter!(
            "discovery_failed_total",
            "Discovery passes that ended without a pick."
        );
        describe_histogram!(
            "provider_fetch_ms",
            "Provider round-trip time in milliseconds."
        );
    });
}

pub struct Telemetry {
    pub handle: PrometheusHandle,
}

impl Telemetry {
    /// Initialize the Prometheus recorder and register all series up front.
    pub fn init() -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_metrics_described();

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
