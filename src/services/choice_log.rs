//! ChoiceLog: append-only daily CSV of selections.
//!
//! One file per UTC calendar day, named `selections-YYYY-MM-DD.csv` and
//! chosen by the server clock at write time, never by the client timestamp.
//! Appends are not serialised across requests.

use crate::{
    models::choice::{ChoiceRecord, ChoiceSubmission},
    services::files::clear_directory,
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, info};

pub const CSV_HEADER: &str = "Timestamp,Response\n";

#[derive(Debug, Error)]
pub enum ChoiceLogError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct ChoiceLog {
    data_dir: PathBuf,
}

impl ChoiceLog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Log file for a given day.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("selections-{}.csv", date.format("%Y-%m-%d")))
    }

    /// Log file for the current UTC day.
    pub fn today_path(&self) -> PathBuf {
        self.path_for(Utc::now().date_naive())
    }

    /// Validate `submission` and append it to today's log.
    pub async fn append(&self, submission: &ChoiceSubmission) -> Result<PathBuf, ChoiceLogError> {
        self.append_on(Utc::now().date_naive(), submission).await
    }

    /// Validate `submission` and append it to the log for `date`.
    ///
    /// Nothing is written when validation fails.
    pub async fn append_on(
        &self,
        date: NaiveDate,
        submission: &ChoiceSubmission,
    ) -> Result<PathBuf, ChoiceLogError> {
        let record = validate(submission)?;
        let path = self.path_for(date);
        self.ensure_log(&path).await?;

        let mut file = OpenOptions::new().append(true).open(&path).await?;
        file.write_all(record.to_csv_row().as_bytes()).await?;
        file.flush().await?;

        info!(
            "recorded selection: response {} at {} in {}",
            record.choice,
            record.timestamp,
            path.display()
        );
        Ok(path)
    }

    /// Create the log for `path` with its header row if it does not exist.
    pub async fn ensure_log(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match OpenOptions::new().write(true).create_new(true).open(path).await {
            Ok(mut file) => {
                file.write_all(CSV_HEADER.as_bytes()).await?;
                file.flush().await?;
                info!("CSV file created with headers: {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                debug!("CSV file exists: {}", path.display());
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Delete every log, past days included.
    pub async fn clear(&self) -> io::Result<()> {
        clear_directory(&self.data_dir).await?;
        info!("cleared selection logs in {}", self.data_dir.display());
        Ok(())
    }
}

/// Turn a raw submission into a loggable record.
///
/// `response` must be present and an integer, either as a JSON number or a
/// numeric string. `timestamp` must be non-empty and free of quotes and line
/// breaks so the CSV row stays intact.
pub fn validate(submission: &ChoiceSubmission) -> Result<ChoiceRecord, ChoiceLogError> {
    let missing = || ChoiceLogError::InvalidInput("Missing response or timestamp".into());

    let response = match &submission.response {
        None | Some(Value::Null) => return Err(missing()),
        Some(value) => value,
    };
    let timestamp = match submission.timestamp.as_deref() {
        Some(ts) if !ts.is_empty() => ts,
        _ => return Err(missing()),
    };

    let choice = match response {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ChoiceLogError::InvalidInput("Response must be an integer".into()))?;

    if timestamp.contains(['"', '\r', '\n']) {
        return Err(ChoiceLogError::InvalidInput(
            "Timestamp must not contain quotes or line breaks".into(),
        ));
    }

    Ok(ChoiceRecord {
        timestamp: timestamp.to_string(),
        choice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::fs;

    fn submission(response: Option<Value>, timestamp: Option<&str>) -> ChoiceSubmission {
        ChoiceSubmission {
            response,
            timestamp: timestamp.map(str::to_string),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn appends_rows_under_a_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChoiceLog::new(dir.path());

        log.append_on(day(), &submission(Some(json!(1)), Some("2024-01-01T00:00:00Z")))
            .await
            .unwrap();
        let path = log
            .append_on(day(), &submission(Some(json!("2")), Some("2024-01-01T00:00:01Z")))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("selections-2024-01-01.csv"));
        assert_eq!(
            fs::read_to_string(&path).await.unwrap(),
            "Timestamp,Response\n\"2024-01-01T00:00:00Z\",1\n\"2024-01-01T00:00:01Z\",2\n"
        );
    }

    #[tokio::test]
    async fn invalid_submission_leaves_log_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChoiceLog::new(dir.path());
        let path = log.path_for(day());
        log.ensure_log(&path).await.unwrap();

        for bad in [
            submission(None, Some("2024-01-01T00:00:00Z")),
            submission(Some(Value::Null), Some("2024-01-01T00:00:00Z")),
            submission(Some(json!(1)), None),
            submission(Some(json!(1)), Some("")),
            submission(Some(json!("one")), Some("2024-01-01T00:00:00Z")),
            submission(Some(json!(1.5)), Some("2024-01-01T00:00:00Z")),
            submission(Some(json!(1)), Some("2024\",9\n")),
        ] {
            let err = log.append_on(day(), &bad).await.unwrap_err();
            assert!(matches!(err, ChoiceLogError::InvalidInput(_)));
        }

        assert_eq!(fs::read_to_string(&path).await.unwrap(), CSV_HEADER);
    }

    #[tokio::test]
    async fn invalid_submission_does_not_create_a_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChoiceLog::new(dir.path());

        assert!(log.append_on(day(), &submission(None, None)).await.is_err());
        assert!(!log.path_for(day()).exists());
    }

    #[tokio::test]
    async fn logs_are_filed_by_server_date() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChoiceLog::new(dir.path());
        let server_day = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

        let path = log
            .append_on(server_day, &submission(Some(json!(2)), Some("1999-12-31T23:59:59Z")))
            .await
            .unwrap();
        assert!(path.ends_with("selections-2025-06-30.csv"));
    }

    #[tokio::test]
    async fn clear_removes_every_day() {
        let dir = tempfile::tempdir().unwrap();
        let log = ChoiceLog::new(dir.path());
        let other_day = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        for date in [day(), other_day] {
            log.append_on(date, &submission(Some(json!(1)), Some("t")))
                .await
                .unwrap();
        }

        log.clear().await.unwrap();
        assert!(!log.path_for(day()).exists());
        assert!(!log.path_for(other_day).exists());
    }
}
