//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API consumed by the farmer-facing shell. Auth, analysis and forum
//! writes require the session cookie; contacts, UI strings and the forum
//! listing are public.

pub mod analysis;
pub mod auth;
pub mod forum;
pub mod reference;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode};
use crate::services::capture::max_image_bytes;
use crate::state::AppState;

/// Room for multipart boundaries and headers around the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Full API router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    // A data URI is base64, so it needs a third more room than raw bytes.
    let upload_limit = max_image_bytes() / 3 * 4 + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/analysis", get(analysis::status).post(analysis::submit))
        .route("/api/analysis/data-uri", post(analysis::submit_data_uri))
        .route("/api/analysis/reset", post(analysis::reset))
        .route("/api/forum/posts", get(forum::list_posts).post(forum::create_post))
        .route("/api/forum/posts/{id}/replies", post(forum::add_reply))
        .route("/api/contacts", get(reference::contacts))
        .route("/api/strings", get(reference::strings))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Non-success status plus the `{code, message, retryable}` body.
pub(crate) fn error_response(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Response {
    (status, Json(ErrorBody::from_error(err))).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
