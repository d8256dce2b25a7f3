//! Administrator surface: config inspection, video upload and full reset.
//!
//! None of these endpoints are authenticated.

use crate::{
    errors::AppError,
    services::{config_store::ConfigMap, multipart},
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{debug, error, info};

/// `GET /config` - the raw config blob.
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigMap> {
    Json(state.config.load().await)
}

/// `POST /admin/upload` - replace one or both videos.
///
/// The body is fully buffered before decoding. Any rejected field fails the
/// whole request with 400, even though accepted fields are already on disk.
pub async fn upload_media(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let boundary = multipart::boundary_from_content_type(content_type)?;

    let files = multipart::decode_files(&body, &boundary);
    debug!(
        "decoded {} file part(s) from {} byte upload",
        files.len(),
        body.len()
    );

    state.uploads.apply(&files).await?;
    Ok((StatusCode::OK, "Configuration saved"))
}

/// `POST /admin/clear` - delete videos and logs, and empty the config.
///
/// The three steps run concurrently and each runs to completion; any failure
/// makes the response a 500.
pub async fn clear_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let (videos, logs, config) = tokio::join!(
        state.uploads.clear_media(),
        state.choices.clear(),
        state.config.reset(),
    );

    let failures: Vec<String> = [
        videos.err().map(|err| format!("videos: {}", err)),
        logs.err().map(|err| format!("logs: {}", err)),
        config.err().map(|err| format!("config: {}", err)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !failures.is_empty() {
        error!("error clearing resources: {}", failures.join("; "));
        return Err(AppError::internal_with("Failed to clear resources"));
    }

    info!("videos, selection logs and configuration cleared");
    Ok((StatusCode::OK, "Videos and configuration cleared successfully"))
}
