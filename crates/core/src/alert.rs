//! Alert classification.
//!
//! A tier is derived from two independent escalation paths, combined with logical OR:
//! - the aggregate path, driven by the composite score;
//! - the single-parameter path, driven by any one parameter in its extreme band.
//!
//! A single catastrophic parameter is never diluted by otherwise normal readings.

use crate::news2::{News2Score, SubScore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite score at or above which the tier is always high.
pub const HIGH_COMPOSITE_THRESHOLD: u8 = 7;

/// Composite score at or above which the tier is at least medium.
pub const MEDIUM_COMPOSITE_THRESHOLD: u8 = 5;

/// Band points that mark a single parameter as severely abnormal.
pub const EXTREME_BAND_POINTS: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    Low,
    Medium,
    High,
}

impl AlertTier {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertTier::Low => "low",
            AlertTier::Medium => "medium",
            AlertTier::High => "high",
        }
    }

    /// Display colour used by ward dashboards.
    pub fn colour(self) -> &'static str {
        match self {
            AlertTier::Low => "green",
            AlertTier::Medium => "yellow",
            AlertTier::High => "red",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertTier::Low => "Low Risk - Stable",
            AlertTier::Medium => "Medium Risk - Monitor Closely",
            AlertTier::High => "High Risk - Urgent Medical Attention Required",
        }
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate path to `High`, or the critical flag.
pub fn requires_high(composite: u8, critical: bool) -> bool {
    critical || composite >= HIGH_COMPOSITE_THRESHOLD
}

/// Aggregate path to `Medium`.
pub fn aggregate_medium(composite: u8) -> bool {
    composite >= MEDIUM_COMPOSITE_THRESHOLD
}

/// Single-parameter path: any parameter scoring 3 from its band alone.
pub fn single_parameter_extreme(sub_scores: &[SubScore]) -> bool {
    sub_scores
        .iter()
        .any(|s| s.band_points >= EXTREME_BAND_POINTS)
}

/// Maps a score to its tier.
pub fn classify(score: &News2Score) -> AlertTier {
    if requires_high(score.composite, score.critical) {
        AlertTier::High
    } else if aggregate_medium(score.composite) || single_parameter_extreme(&score.sub_scores) {
        AlertTier::Medium
    } else {
        AlertTier::Low
    }
}

/// The derived result for one measurement set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub composite_score: u8,
    pub sub_scores: Vec<SubScore>,
    pub alert_tier: AlertTier,
    pub critical: bool,
}

impl Evaluation {
    pub fn from_score(score: News2Score) -> Self {
        let alert_tier = classify(&score);
        Self {
            composite_score: score.composite,
            sub_scores: score.sub_scores,
            alert_tier,
            critical: score.critical,
        }
    }
}
