//! Selection submission and the analytics summary built from it.

use crate::{
    errors::AppError,
    models::{analytics::AnalyticsSummary, choice::ChoiceSubmission},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use tracing::warn;

/// `POST /select` - append one selection to today's log.
///
/// The body is parsed by hand so that malformed JSON and missing fields get
/// distinct messages.
pub async fn record_selection(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let submission: ChoiceSubmission = serde_json::from_slice(&body).map_err(|err| {
        warn!("error parsing JSON: {}", err);
        AppError::bad_request("Invalid JSON")
    })?;

    state.choices.append(&submission).await?;
    Ok((StatusCode::OK, "Selection recorded"))
}

/// `GET /analytics/data`
pub async fn analytics_data(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(state.analytics.summarize_today().await?))
}
