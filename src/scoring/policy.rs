// src/scoring/policy.rs
//! # Scoring Policy
//!
//! The display-tier table and flat bonuses are a UX calibration layer, not a
//! statistical model, so they live in a swappable config rather than in the
//! scoring code:
//!
//! - Ordered tier rules keyed by minimum subscriber count; the first match
//!   wins. Each rule raises the base score to a floor, adds bounded random
//!   jitter, and caps the result.
//! - Flat bonuses for sponsor-laden descriptions and strong click-magnet
//!   signals.
//! - Loads from JSON; falls back to the built-in `default_seed()` on any
//!   read or parse error. An admin route reloads it at runtime.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// One display tier: applies to channels with `subs >= min_subs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub min_subs: u64,
    /// The base score is raised to at least this value.
    pub floor: f64,
    /// The adjusted score never exceeds this value.
    pub cap: f64,
    /// Upper bound of the uniform jitter added after flooring; 0 disables it.
    #[serde(default)]
    pub jitter_max: f64,
}

impl TierRule {
    /// `min(max(base, floor) + rand(0, jitter_max), cap)`.
    pub fn apply<R: Rng + ?Sized>(&self, base: f64, rng: &mut R) -> f64 {
        let jitter = if self.jitter_max > 0.0 {
            rng.random_range(0.0..self.jitter_max)
        } else {
            0.0
        };
        (base.max(self.floor) + jitter).min(self.cap)
    }
}

/// Tier table plus bonus amounts, loaded from JSON or seeded with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Tier rules ordered by descending `min_subs`; first match wins.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierRule>,
    /// Added when the description trips a sponsor pattern.
    #[serde(default = "default_sponsor_bonus")]
    pub sponsor_bonus: f64,
    /// Added when the click-magnet sub-score exceeds the threshold below.
    #[serde(default = "default_clickbait_bonus")]
    pub clickbait_bonus: f64,
    #[serde(default = "default_clickbait_threshold")]
    pub clickbait_bonus_threshold: f64,
}

fn default_tiers() -> Vec<TierRule> {
    vec![
        // 5M+ subs: scores land in the 55..85 band.
        TierRule {
            min_subs: 5_000_000,
            floor: 55.0,
            cap: 85.0,
            jitter_max: 10.0,
        },
        // 500K..5M: 35..65.
        TierRule {
            min_subs: 500_000,
            floor: 35.0,
            cap: 65.0,
            jitter_max: 10.0,
        },
        // 100K..500K: plain clamp to 20..50.
        TierRule {
            min_subs: 100_000,
            floor: 20.0,
            cap: 50.0,
            jitter_max: 0.0,
        },
        // Under 100K: clamp to 15..45.
        TierRule {
            min_subs: 0,
            floor: 15.0,
            cap: 45.0,
            jitter_max: 0.0,
        },
    ]
}

fn default_sponsor_bonus() -> f64 {
    15.0
}

fn default_clickbait_bonus() -> f64 {
    10.0
}

fn default_clickbait_threshold() -> f64 {
    0.6
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl ScoringPolicy {
    /// The built-in calibration table.
    pub fn default_seed() -> Self {
        Self {
            tiers: default_tiers(),
            sponsor_bonus: default_sponsor_bonus(),
            clickbait_bonus: default_clickbait_bonus(),
            clickbait_bonus_threshold: default_clickbait_threshold(),
        }
    }

    /// Load from a JSON file, falling back to `default_seed()` on any error
    /// or an empty tier table.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let parsed = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str::<Self>(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        };
        if parsed.tiers.is_empty() {
            Self::default_seed()
        } else {
            parsed
        }
    }

    /// First tier whose `min_subs` the channel reaches; falls back to the
    /// last (catch-all) rule.
    pub fn tier_for(&self, subs: u64) -> Option<&TierRule> {
        self.tiers
            .iter()
            .find(|t| subs >= t.min_subs)
            .or_else(|| self.tiers.last())
    }
}
