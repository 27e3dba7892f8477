//! Form router.
//!
//! Every response carries `Cache-Control: no-store`: reports and
//! explanations must not outlive the session in any browser or proxy cache.

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::AppState;

/// Build the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(endpoints::form::show))
        .route("/simplify", post(endpoints::form::simplify))
        .route("/session/reset", post(endpoints::form::reset))
        .route("/download", get(endpoints::download::explanation))
        .route("/feedback", post(endpoints::feedback::submit))
        .route("/health", get(endpoints::health::check))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
