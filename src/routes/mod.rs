//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API under `/api`, the realtime socket at `/api/ws`, and two HTML
//! surfaces: the public landing page (`/p/{slug}`) and the live preview
//! (`/preview/{creator_id}`). Identity is handled by the gateway in front of
//! this service; no route here authenticates.

pub mod creators;
pub mod public;
pub mod strategies;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch, post, put};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::frame::ErrorCode;
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/creators", get(creators::list_creators).post(creators::create_creator))
        .route("/api/creators/duplicates", get(creators::check_duplicates))
        .route("/api/creators/{id}", get(creators::get_creator))
        .route("/api/creators/{id}/theme", get(creators::get_theme).put(creators::put_theme))
        .route("/api/creators/{id}/theme/actions", post(creators::apply_theme_action))
        .route("/api/creators/{id}/sections", get(creators::get_sections))
        .route("/api/companies", get(strategies::list_companies))
        .route("/api/strategies", get(strategies::list_strategies))
        .route("/api/strategies/{id}", get(strategies::get_strategy))
        .route("/api/strategies/{id}/budget", patch(strategies::update_budget))
        .route("/api/strategies/{id}/deliverables", post(strategies::add_deliverable))
        .route(
            "/api/strategies/{id}/deliverables/{item_id}",
            patch(strategies::set_deliverable_quantity).delete(strategies::remove_deliverable),
        )
        .route("/api/strategies/{id}/flyer-slots", put(strategies::replace_flyer_slots))
        .route("/api/ws", get(ws::handle_ws))
        .route("/p/{key}", get(public::landing_page))
        .route("/preview/{creator_id}", get(public::preview_page))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// API ERRORS
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    code: &'static str,
    message: String,
    retryable: bool,
}

/// JSON error response: `{code, message, retryable}` with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        if status.is_server_error() {
            tracing::error!(code = err.error_code(), error = %err, "request failed");
        }
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code, message: message.into(), retryable: false }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody { code: self.code, message: self.message, retryable: self.retryable };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
