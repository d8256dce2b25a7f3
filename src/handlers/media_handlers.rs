//! Range-only video delivery for `/video1` and `/video2`.
//!
//! Whole-file responses are never produced: a request without a usable
//! `Range` header gets 416. Neither slot is served until both videos are
//! configured and on disk.

use crate::{errors::AppError, models::media::MediaField, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};

/// `GET /video1`
pub async fn get_video1(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    stream_media(&state, MediaField::Video1, &headers).await
}

/// `GET /video2`
pub async fn get_video2(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    stream_media(&state, MediaField::Video2, &headers).await
}

async fn stream_media(
    state: &AppState,
    field: MediaField,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let Some(path) = state.config.playable_path(field).await else {
        return Err(AppError::not_found("Video not configured"));
    };

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    let stream = state.media.open(&path, range).await?;

    let mut response = Response::new(Body::from_stream(stream.body));
    *response.status_mut() = StatusCode::PARTIAL_CONTENT;
    let headers = response.headers_mut();
    stream.plan.write_headers(headers);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(stream.content_type),
    );

    Ok(response)
}
