//! Aggregate view over a day's selections.

use serde::Serialize;

/// Placeholder used for timestamps when nothing has been recorded.
pub const NEVER: &str = "Never";

/// Summary returned by `GET /analytics/data`.
///
/// Derived on every request; never stored. Field names on the wire match the
/// analytics page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    #[serde(rename = "totalSelections")]
    pub total: u64,

    #[serde(rename = "prototype1")]
    pub count1: u64,

    #[serde(rename = "prototype2")]
    pub count2: u64,

    #[serde(rename = "percentage1")]
    pub pct1: f64,

    #[serde(rename = "percentage2")]
    pub pct2: f64,

    /// When this summary was computed, or `Never` when no log exists.
    #[serde(rename = "lastUpdated")]
    pub last_updated_at: String,

    /// Latest recorded timestamp, or `Never`.
    #[serde(rename = "lastResponse")]
    pub last_record_timestamp: String,
}

impl AnalyticsSummary {
    /// Summary for a day without a log file.
    pub fn empty() -> Self {
        Self {
            total: 0,
            count1: 0,
            count2: 0,
            pct1: 0.0,
            pct2: 0.0,
            last_updated_at: NEVER.into(),
            last_record_timestamp: NEVER.into(),
        }
    }
}
