//! Selection submissions and the validated records written to the log.

use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /select` as sent by the poll page.
///
/// Fields stay loosely typed here so that missing and malformed values can be
/// reported separately from unparseable JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceSubmission {
    pub response: Option<Value>,
    pub timestamp: Option<String>,
}

/// One validated log row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRecord {
    /// Client-supplied timestamp, stored verbatim.
    pub timestamp: String,

    /// Selected option; `1` and `2` are the meaningful values.
    pub choice: i64,
}

impl ChoiceRecord {
    /// CSV row for this record, including the trailing newline.
    pub fn to_csv_row(&self) -> String {
        format!("\"{}\",{}\n", self.timestamp, self.choice)
    }
}
