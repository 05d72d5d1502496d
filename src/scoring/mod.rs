//! Scoring primitives shared by every evaluator
//!
//! # Scoring Formula
//!
//! ```text
//! Check score    = round(achieved / max × 10), clamped to [0, 10]
//!                  -1 when max == 0 (no applicable criteria)
//!
//! Combined score = min(sub-scores)            (AggregationPolicy::Minimum)
//!                = round(mean(sub-scores))    (AggregationPolicy::Mean)
//!                  inconclusive sub-scores are left out of both
//!
//! Overall score  = Σ score × risk_weight / Σ risk_weight
//!                  over conclusive checks only
//! ```
//!
//! # Risk Weights
//!
//! - Critical: 10.0
//! - High: 7.5
//! - Medium: 5.0
//! - Low: 2.5

use crate::models::{CheckResult, INCONCLUSIVE_RESULT_SCORE, MAX_RESULT_SCORE, MIN_RESULT_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scale `achieved` out of `max` points onto the 0-10 range.
pub fn proportional_score(achieved: u32, max: u32) -> i32 {
    if max == 0 {
        return INCONCLUSIVE_RESULT_SCORE;
    }
    let ratio = f64::from(achieved.min(max)) / f64::from(max);
    let score = (ratio * f64::from(MAX_RESULT_SCORE)).round() as i32;
    score.clamp(MIN_RESULT_SCORE, MAX_RESULT_SCORE)
}

/// How several scores for the same check are folded into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationPolicy {
    /// Worst sub-score wins
    #[default]
    Minimum,
    /// Rounded arithmetic mean
    Mean,
}

impl std::str::FromStr for AggregationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimum" | "min" | "worst" => Ok(AggregationPolicy::Minimum),
            "mean" | "average" | "avg" => Ok(AggregationPolicy::Mean),
            _ => Err(anyhow::anyhow!(
                "Unknown aggregation policy '{}'. Valid policies: minimum, mean",
                s
            )),
        }
    }
}

/// Combine several scores, ignoring inconclusive (-1) inputs.
///
/// Returns -1 when no input is conclusive.
pub fn aggregate_scores(policy: AggregationPolicy, scores: &[i32]) -> i32 {
    let conclusive: Vec<i32> = scores
        .iter()
        .copied()
        .filter(|s| *s != INCONCLUSIVE_RESULT_SCORE)
        .map(|s| s.clamp(MIN_RESULT_SCORE, MAX_RESULT_SCORE))
        .collect();

    if conclusive.is_empty() {
        return INCONCLUSIVE_RESULT_SCORE;
    }

    match policy {
        AggregationPolicy::Minimum => conclusive.iter().copied().min().unwrap_or(MIN_RESULT_SCORE),
        AggregationPolicy::Mean => {
            let sum: i32 = conclusive.iter().sum();
            (f64::from(sum) / conclusive.len() as f64).round() as i32
        }
    }
}

/// Weighted mean of `(score, weight)` pairs, skipping inconclusive scores.
pub fn weighted_score(parts: &[(i32, u32)]) -> i32 {
    let mut total = 0u32;
    let mut weights = 0u32;
    for (score, weight) in parts {
        if *score == INCONCLUSIVE_RESULT_SCORE {
            continue;
        }
        total += (*score).clamp(MIN_RESULT_SCORE, MAX_RESULT_SCORE) as u32 * weight;
        weights += weight;
    }
    if weights == 0 {
        return INCONCLUSIVE_RESULT_SCORE;
    }
    (f64::from(total) / f64::from(weights)).round() as i32
}

/// How much a check contributes to the overall repository score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Risk {
    pub fn weight(&self) -> f64 {
        match self {
            Risk::Critical => 10.0,
            Risk::High => 7.5,
            Risk::Medium => 5.0,
            Risk::Low => 2.5,
        }
    }
}

impl std::fmt::Display for Risk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Risk::Low => write!(f, "Low"),
            Risk::Medium => write!(f, "Medium"),
            Risk::High => write!(f, "High"),
            Risk::Critical => write!(f, "Critical"),
        }
    }
}

impl std::str::FromStr for Risk {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Risk::Low),
            "medium" => Ok(Risk::Medium),
            "high" => Ok(Risk::High),
            "critical" => Ok(Risk::Critical),
            _ => Err(anyhow::anyhow!(
                "Unknown risk '{}'. Valid values: low, medium, high, critical",
                s
            )),
        }
    }
}

/// Risk-weighted overall score across check results.
///
/// Inconclusive results and checks without a known risk are left out.
/// Returns -1.0 when nothing conclusive remains.
pub fn overall_score(results: &[CheckResult], risks: &HashMap<String, Risk>) -> f64 {
    let mut total = 0.0;
    let mut weights = 0.0;
    for result in results.iter().filter(|r| r.is_conclusive()) {
        let Some(risk) = risks.get(&result.name) else {
            continue;
        };
        total += f64::from(result.score) * risk.weight();
        weights += risk.weight();
    }
    if weights == 0.0 {
        return f64::from(INCONCLUSIVE_RESULT_SCORE);
    }
    ((total / weights) * 10.0).round() / 10.0
}
