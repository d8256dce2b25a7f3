//! Values produced while decoding and validating admin uploads.

use bytes::Bytes;
use std::path::PathBuf;

/// One named section of a multipart body.
///
/// `content` is a view into the original request buffer, not a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    /// Value of the `name` disposition parameter.
    pub field_name: String,

    /// Value of the `filename` parameter; `None` for plain form fields.
    pub filename: Option<String>,

    /// Raw part body with the framing CRLF removed.
    pub content: Bytes,
}

/// A file part as surfaced to upload callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Bytes,
}

/// Per-field result of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted(PathBuf),
    Rejected(String),
}
