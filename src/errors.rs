use crate::services::{
    choice_log::ChoiceLogError, config_store::ConfigError, media_service::MediaError,
    multipart::MultipartError, upload_service::UploadError,
};
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::error;

/// A lightweight wrapper for request failures that keeps the message local.
///
/// Rendered as a plain-text body; the message already carries the status
/// prefix shown to clients.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,

    /// Resource length reported in `Content-Range` on a 416.
    pub unsatisfied_length: Option<u64>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            unsatisfied_length: None,
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(detail: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("400 - Bad Request: {}", detail),
        )
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 416 Range Not Satisfiable
    pub fn range_not_satisfiable(total: u64) -> Self {
        Self {
            unsatisfied_length: Some(total),
            ..Self::new(StatusCode::RANGE_NOT_SATISFIABLE, "Range Not Satisfiable")
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "500 - Internal Server Error")
    }

    /// 500 Internal Server Error with a client-facing explanation.
    pub fn internal_with(detail: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("500 - Internal Server Error: {}", detail),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.message).into_response();
        if let Some(total) = self.unsatisfied_length {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", total)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        error!("storage error: {}", err);
        AppError::internal()
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::NotFound(path) => {
                error!("video file not found: {}", path.display());
                AppError::not_found("404 - Video Not Found")
            }
            MediaError::Range { total, .. } => AppError::range_not_satisfiable(total),
            MediaError::Io(err) => err.into(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::bad_request(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected(_) | UploadError::NoValidFiles => AppError::bad_request(err),
            UploadError::Storage { .. } | UploadError::Config(_) => {
                error!("upload failed: {}", err);
                AppError::internal()
            }
        }
    }
}

impl From<ChoiceLogError> for AppError {
    fn from(err: ChoiceLogError) -> Self {
        match err {
            ChoiceLogError::InvalidInput(detail) => AppError::bad_request(detail),
            ChoiceLogError::Io(err) => {
                error!("error writing to CSV: {}", err);
                AppError::internal()
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        error!("config error: {}", err);
        AppError::internal()
    }
}
