//! Crop analysis routes: upload, poll, reset.
//!
//! An upload is encoded synchronously (so a bad file fails the request
//! itself) and then diagnosed in the background; clients poll
//! `GET /api/analysis` for the outcome.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use serde::Deserialize;

use super::auth::AuthUser;
use super::error_response;
use crate::services::analysis::{self, AnalysisError};
use crate::services::analysis_state::{AnalysisSnapshot, TransitionError};
use crate::services::capture::{self, CaptureError, EncodedImage};
use crate::services::diagnosis::DiagnosisError;
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

pub(crate) fn capture_error_to_status(err: &CaptureError) -> StatusCode {
    match err {
        CaptureError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        CaptureError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        CaptureError::Read(_)
        | CaptureError::Empty
        | CaptureError::MalformedDataUri
        | CaptureError::InvalidBase64(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub(crate) fn analysis_error_to_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::Diagnosis(DiagnosisError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Transition(TransitionError::Busy) => StatusCode::CONFLICT,
        AnalysisError::Diagnosis(_) | AnalysisError::Transition(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn capture_failure(err: &CaptureError) -> Response {
    tracing::warn!(code = crate::error::ErrorCode::error_code(err), error = %err, "analysis: upload rejected");
    error_response(capture_error_to_status(err), err)
}

/// Body-limit overruns surface as multipart errors; report them as oversize.
fn multipart_to_capture_error(err: &MultipartError) -> CaptureError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let max = capture::max_image_bytes();
        return CaptureError::TooLarge { size: max as u64 + 1, max };
    }
    CaptureError::Read(err.body_text())
}

async fn dispatch(state: &AppState, auth: &AuthUser, image: EncodedImage) -> Result<(StatusCode, Json<AnalysisSnapshot>), Response> {
    let snapshot = analysis::start(&auth.analysis, state.llm.clone(), state.diagnosis, image)
        .await
        .map_err(|e| error_response(analysis_error_to_status(&e), &e))?;
    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/analysis`: multipart upload, field `image`.
pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnalysisSnapshot>), Response> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| capture_failure(&multipart_to_capture_error(&e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let declared = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| capture_failure(&multipart_to_capture_error(&e)))?;
        upload = Some((bytes, declared));
        break;
    }

    let Some((bytes, declared)) = upload else {
        return Err(capture_failure(&CaptureError::Empty));
    };
    let image = capture::encode_image(&bytes, declared.as_deref(), capture::max_image_bytes())
        .map_err(|e| capture_failure(&e))?;
    dispatch(&state, &auth, image).await
}

#[derive(Debug, Deserialize)]
pub struct DataUriBody {
    /// `data:<mime>;base64,<payload>` as produced by a browser file reader.
    pub image: String,
}

/// `POST /api/analysis/data-uri`: same as `submit`, image sent as a data URI.
pub async fn submit_data_uri(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DataUriBody>,
) -> Result<(StatusCode, Json<AnalysisSnapshot>), Response> {
    let image = capture::encode_data_uri(&body.image, capture::max_image_bytes()).map_err(|e| capture_failure(&e))?;
    dispatch(&state, &auth, image).await
}

/// `GET /api/analysis`: current snapshot of this session.
pub async fn status(auth: AuthUser) -> Json<AnalysisSnapshot> {
    Json(analysis::snapshot(&auth.analysis).await)
}

/// `POST /api/analysis/reset`: cancel and clear everything.
pub async fn reset(auth: AuthUser) -> Json<AnalysisSnapshot> {
    Json(analysis::reset(&auth.analysis).await)
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
