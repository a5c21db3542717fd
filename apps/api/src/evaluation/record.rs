//! The write-once evaluation record and its spreadsheet row encoding.
//!
//! Row layout (the de facto wire format downstream dashboards read):
//! timestamp, reviewer, candidate, role, company, automated total,
//! consultant total, combined total, then the 6 automated per-category
//! points in `MODEL_CATEGORIES` order, then the 11 consultant per-category
//! points in `CONSULTANT_CATEGORIES` order — 25 cells. Reordering or
//! resizing either category list is a breaking schema change.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::ScoreBreakdown;

/// Number of cells preceding the per-category blocks.
const HEADER_CELLS: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    pub timestamp: DateTime<Utc>,
    pub reviewer: String,
    pub candidate: String,
    pub role: String,
    pub company: String,
    pub model_total: i64,
    pub consultant_total: i64,
    pub combined_total: i64,
    /// Unsigned per-category points, in fixed column order.
    pub model_scores: Vec<i64>,
    pub consultant_scores: Vec<i64>,
}

impl EvaluationRecord {
    pub fn from_breakdown(
        timestamp: DateTime<Utc>,
        reviewer: &str,
        candidate: &str,
        role: &str,
        company: &str,
        breakdown: &ScoreBreakdown,
    ) -> Self {
        Self {
            timestamp,
            reviewer: reviewer.to_string(),
            candidate: candidate.to_string(),
            role: role.to_string(),
            company: company.to_string(),
            model_total: breakdown.model_subtotal,
            consultant_total: breakdown.consultant_subtotal,
            combined_total: breakdown.total_score,
            model_scores: breakdown.model.iter().map(|c| c.points).collect(),
            consultant_scores: breakdown.consultant.iter().map(|c| c.points).collect(),
        }
    }

    /// Encodes the record as one spreadsheet row in the fixed column order.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(
            HEADER_CELLS + self.model_scores.len() + self.consultant_scores.len(),
        );
        row.push(self.timestamp.to_rfc3339());
        row.push(self.reviewer.clone());
        row.push(self.candidate.clone());
        row.push(self.role.clone());
        row.push(self.company.clone());
        row.push(self.model_total.to_string());
        row.push(self.consultant_total.to_string());
        row.push(self.combined_total.to_string());
        row.extend(self.model_scores.iter().map(i64::to_string));
        row.extend(self.consultant_scores.iter().map(i64::to_string));
        row
    }
}
