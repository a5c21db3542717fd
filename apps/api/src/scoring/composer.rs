//! Score composition — converts raw ratings from both streams into a signed
//! composite total and an auditable per-category breakdown.
//!
//! Fully deterministic given the two raw-rating maps; no I/O, no error
//! paths. Unknown tokens and unrated categories score 0 by vocabulary
//! policy, so composition can never fail mid-session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::scoring::categories::{Category, Polarity, CONSULTANT_CATEGORIES, MODEL_CATEGORIES};
use crate::scoring::vocabulary;

/// Static reference total reported alongside every composed score.
pub const BENCHMARK_SCORE: i64 = 22;

/// What to do with a total the rater reported itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalPolicy {
    /// Re-sum per-category points and use that; a differing reported total
    /// is surfaced as a discrepancy.
    #[default]
    PreferRecomputed,
    /// Use the reported total as the automated subtotal when present. The
    /// discrepancy is still surfaced.
    TrustReported,
}

/// One scored dimension in the breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub raw_value: String,
    /// Unsigned vocabulary points — what gets persisted per column.
    pub points: i64,
    /// Signed contribution to the stream subtotal (negative for inverted
    /// categories).
    pub contribution: i64,
}

/// Reported-vs-recomputed mismatch on the automated stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalDiscrepancy {
    pub reported: i64,
    pub recomputed: i64,
}

/// Full composed result for one scoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub model: Vec<CategoryScore>,
    pub consultant: Vec<CategoryScore>,
    pub model_subtotal: i64,
    pub consultant_subtotal: i64,
    pub total_score: i64,
    pub benchmark: i64,
    pub total_discrepancy: Option<TotalDiscrepancy>,
}

/// Composes both rating streams into a breakdown.
///
/// `model_ratings` and `consultant_ratings` map canonical category names to
/// raw tokens; categories absent from a map are scored as unrated (0).
pub fn compose(
    model_ratings: &HashMap<String, String>,
    consultant_ratings: &HashMap<String, String>,
    reported_total: Option<i64>,
    policy: TotalPolicy,
) -> ScoreBreakdown {
    let (model, recomputed) = score_stream(MODEL_CATEGORIES, model_ratings);
    let (consultant, consultant_subtotal) = score_stream(CONSULTANT_CATEGORIES, consultant_ratings);

    let total_discrepancy = reported_total
        .filter(|r| *r != recomputed)
        .map(|reported| TotalDiscrepancy {
            reported,
            recomputed,
        });

    let model_subtotal = match policy {
        TotalPolicy::PreferRecomputed => recomputed,
        TotalPolicy::TrustReported => reported_total.unwrap_or(recomputed),
    };

    ScoreBreakdown {
        model,
        consultant,
        model_subtotal,
        consultant_subtotal,
        total_score: model_subtotal + consultant_subtotal,
        benchmark: BENCHMARK_SCORE,
        total_discrepancy,
    }
}

fn score_stream(
    categories: &'static [Category],
    ratings: &HashMap<String, String>,
) -> (Vec<CategoryScore>, i64) {
    let mut scored = Vec::with_capacity(categories.len());
    let mut subtotal = 0;
    for cat in categories {
        let raw = ratings
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(cat.name))
            .map(|(_, v)| v.as_str())
            .unwrap_or(super::parser::UNRATED);
        let points = vocabulary::lookup(raw);
        let contribution = match cat.polarity {
            Polarity::Normal => points,
            Polarity::Inverted => -points,
        };
        subtotal += contribution;
        scored.push(CategoryScore {
            category: cat.name.to_string(),
            raw_value: raw.to_string(),
            points,
            contribution,
        });
    }
    (scored, subtotal)
}
