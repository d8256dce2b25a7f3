//! Defines the HTTP surface of the poll service.
//!
//! ## Structure
//! - **Media**
//!   - `GET  /video1`, `GET /video2` - range-only video delivery
//! - **Selections**
//!   - `POST /select` - record one choice
//!   - `GET  /analytics/data` - today's summary
//! - **Admin**
//!   - `GET  /config` - raw config blob
//!   - `POST /admin/upload` - multipart upload of `video1`/`video2`
//!   - `POST /admin/clear` - delete videos, logs and config
//! - **Pages**
//!   - `GET  /`, `/admin`, `/analytics` - HTML pages; anything else is looked
//!     up under the public directory
//!
//! CORS is open to any origin.

use crate::{
    config::AppConfig,
    handlers::{
        admin_handlers::{clear_all, get_config, upload_media},
        choice_handlers::{analytics_data, record_selection},
        health_handlers::{healthz, readyz},
        media_handlers::{get_video1, get_video2},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes(cfg: &AppConfig) -> Router<AppState> {
    let public = &cfg.public_dir;

    Router::new()
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // media
        .route("/video1", get(get_video1))
        .route("/video2", get(get_video2))
        // selections
        .route("/select", post(record_selection))
        .route("/analytics/data", get(analytics_data))
        // admin
        .route("/config", get(get_config))
        .route(
            "/admin/upload",
            post(upload_media).layer(DefaultBodyLimit::max(cfg.max_upload_bytes)),
        )
        .route("/admin/clear", post(clear_all))
        // pages
        .route_service("/", ServeFile::new(public.join("index.html")))
        .route_service("/admin", ServeFile::new(public.join("admin.html")))
        .route_service("/analytics", ServeFile::new(public.join("analytics.html")))
        .fallback_service(ServeDir::new(public))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
