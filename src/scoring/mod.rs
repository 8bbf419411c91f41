// src/scoring/mod.rs
//! Bias scoring pipeline: six feature scorers, the composite 0..100 score
//! with display-tier adjustment, and the configurable tier/bonus policy.

pub mod composite;
pub mod features;
pub mod policy;

pub use composite::{
    bias_level, dominant_factor, score_videos, score_videos_with_rng, BiasLevel, DominantFactor,
};
pub use policy::{ScoringPolicy, TierRule};
