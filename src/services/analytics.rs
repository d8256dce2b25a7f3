//! AnalyticsService: summary statistics over today's selection log.
//!
//! Nothing is cached: every call re-reads the log and recounts.

use crate::{
    models::analytics::{AnalyticsSummary, NEVER},
    services::choice_log::ChoiceLog,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::io::{self, ErrorKind};
use tokio::fs;

#[derive(Clone, Debug)]
pub struct AnalyticsService {
    log: ChoiceLog,
}

impl AnalyticsService {
    pub fn new(log: ChoiceLog) -> Self {
        Self { log }
    }

    /// Summarise the current day's log.
    pub async fn summarize_today(&self) -> io::Result<AnalyticsSummary> {
        let path = self.log.today_path();
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };
        Ok(summarize(contents.as_deref(), Utc::now()))
    }
}

/// Reduce raw log text into a summary computed at `now`.
///
/// `None` means the log does not exist. Rows whose response is not `1` or `2`
/// are not counted, but their timestamps still compete for the latest one.
pub fn summarize(contents: Option<&str>, now: DateTime<Utc>) -> AnalyticsSummary {
    let Some(contents) = contents else {
        return AnalyticsSummary::empty();
    };

    let mut count1 = 0u64;
    let mut count2 = 0u64;
    let mut latest: Option<(Option<DateTime<Utc>>, &str)> = None;

    for line in contents.trim().lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (timestamp, response) = line.rsplit_once(',').unwrap_or((line, ""));
        let timestamp = timestamp.trim().trim_matches('"');

        match response.trim().parse::<i64>() {
            Ok(1) => count1 += 1,
            Ok(2) => count2 += 1,
            _ => {}
        }

        let parsed = parse_timestamp(timestamp);
        let newer = match (&latest, parsed) {
            (None, _) => true,
            (Some((None, _)), Some(_)) => true,
            (Some((Some(current), _)), Some(candidate)) => candidate > *current,
            (Some(_), None) => false,
        };
        if newer {
            latest = Some((parsed, timestamp));
        }
    }

    let total = count1 + count2;
    AnalyticsSummary {
        total,
        count1,
        count2,
        pct1: percentage(count1, total),
        pct2: percentage(count2, total),
        last_updated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        last_record_timestamp: latest
            .map(|(_, raw)| raw.to_string())
            .unwrap_or_else(|| NEVER.into()),
    }
}

/// `100 * part / total`, rounded to two decimals; `0` for an empty total.
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 10_000.0 / total as f64).round() / 100.0
}

/// Interpret a client timestamp as a point in time.
///
/// Accepts RFC 3339, a zone-less date-time (read as UTC) and a bare date.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
