// src/lib.rs
//! Homepage bias scoring and silenced-video discovery.
//!
//! Pipeline: seeds from the extraction layer are enriched with API stats,
//! normalized against batch percentiles, scored on six bias factors, then
//! the loudest videos get an under-exposed counterpart search.

pub mod api;
pub mod derived;
pub mod discovery;
pub mod enrich;
pub mod keywords;
pub mod providers;
pub mod scoring;
pub mod stats;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::api::{create_router, AppState};
pub use crate::discovery::find_silenced_videos;
pub use crate::enrich::enrich_seeds;
pub use crate::scoring::{score_videos, ScoringPolicy};
