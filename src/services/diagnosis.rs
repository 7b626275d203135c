//! Diagnosis service: encoded crop photo in, validated `AnalysisResult` out.
//!
//! DESIGN
//! ======
//! The only integration point with the generative-AI backend. One request,
//! no retry. The backend is asked for a JSON object matching
//! [`diagnosis_schema`]; its text is then decoded strictly: a missing field,
//! a non-string field, a blank field or an urgency outside Low/Medium/High
//! is a [`SchemaViolation`], never a best-effort cast.
//!
//! Every failure kind stays distinct internally (logged with its code) but
//! collapses to one localized retry message for the farmer.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::capture::EncodedImage;
use crate::env::{env_bool, env_parse};
use crate::error::ErrorCode;
use crate::llm::VisionChat;
use crate::llm::schema::diagnosis_schema;
use crate::llm::types::{InlineImage, LlmError, VisionRequest};
use crate::locale;

pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 30;

/// MIME label the legacy web client attached to every upload.
pub const LEGACY_MIME_LABEL: &str = "image/jpeg";

const DIAGNOSIS_PROMPT: &str = "\
You are an expert agricultural scientist. Examine this crop photo and identify any \
disease, pest infestation or nutrient deficiency affecting the plant.
Write every value in Bengali (Bangla).
Return a JSON object with exactly these keys:
- problemName: name of the disease, pest or deficiency
- description: a short explanation of the problem
- solution: step-by-step remedies, one step per line, numbered \"1. \", \"2. \", ...
- urgency: exactly one of 'Low', 'Medium', 'High' (in English)";

// =============================================================================
// RESULT TYPES
// =============================================================================

/// How soon the farmer needs to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Exact, case-sensitive match against the declared literals.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

/// Successful outcome of one diagnosis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub problem_name: String,
    pub description: String,
    /// Free text, newline-delimited steps, optionally numbered.
    pub solution: String,
    pub urgency: Urgency,
}

// =============================================================================
// ERRORS
// =============================================================================

/// JSON was valid but did not honor the declared schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is not a string")]
    NotAString(&'static str),
    #[error("field `{0}` is empty")]
    EmptyField(&'static str),
    #[error("urgency `{0}` is not one of Low, Medium, High")]
    UnknownUrgency(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("diagnosis backend not configured")]
    NotConfigured,
    #[error("transport failed: {0}")]
    Transport(LlmError),
    #[error("no response from backend: {0}")]
    Timeout(String),
    #[error("backend returned no text")]
    EmptyResponse,
    #[error("backend text is not JSON: {0}")]
    MalformedResponse(String),
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),
}

impl From<LlmError> for DiagnosisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::ApiTimeout(detail) => Self::Timeout(detail),
            other => Self::Transport(other),
        }
    }
}

impl ErrorCode for DiagnosisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_DIAGNOSIS_NOT_CONFIGURED",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
            Self::SchemaViolation(_) => "E_SCHEMA_VIOLATION",
        }
    }

    fn retryable(&self) -> bool {
        !matches!(self, Self::NotConfigured)
    }

    fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => locale::ANALYSIS_UNAVAILABLE.to_string(),
            _ => locale::ANALYSIS_FAILED.to_string(),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Which MIME type to attach to the outgoing image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MimeLabel {
    /// The type sniffed from the uploaded bytes.
    #[default]
    Detected,
    /// Always `image/jpeg`, whatever was uploaded.
    LegacyJpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosisConfig {
    pub timeout: Duration,
    pub mime_label: MimeLabel,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS), mime_label: MimeLabel::Detected }
    }
}

impl DiagnosisConfig {
    /// - `ANALYSIS_TIMEOUT_SECS`: default 30
    /// - `ANALYSIS_LEGACY_JPEG_LABEL`: label every upload `image/jpeg` (default false)
    #[must_use]
    pub fn from_env() -> Self {
        let timeout_secs = match env_parse("ANALYSIS_TIMEOUT_SECS", DEFAULT_ANALYSIS_TIMEOUT_SECS) {
            0 => DEFAULT_ANALYSIS_TIMEOUT_SECS,
            secs => secs,
        };
        let mime_label = if env_bool("ANALYSIS_LEGACY_JPEG_LABEL").unwrap_or(false) {
            MimeLabel::LegacyJpeg
        } else {
            MimeLabel::Detected
        };
        Self { timeout: Duration::from_secs(timeout_secs), mime_label }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

#[must_use]
pub fn build_request(image: &EncodedImage, config: &DiagnosisConfig) -> VisionRequest {
    let mime_type = match config.mime_label {
        MimeLabel::Detected => image.mime_type.clone(),
        MimeLabel::LegacyJpeg => LEGACY_MIME_LABEL.to_string(),
    };
    VisionRequest {
        prompt: DIAGNOSIS_PROMPT.to_string(),
        image: InlineImage { mime_type, data: image.payload.clone() },
        response_schema: diagnosis_schema(),
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Send one diagnosis request and validate the answer.
///
/// # Errors
///
/// Returns the classified [`DiagnosisError`]; callers show
/// [`ErrorCode::user_message`] and nothing else.
pub async fn analyze(
    llm: &Arc<dyn VisionChat>,
    config: &DiagnosisConfig,
    image: &EncodedImage,
) -> Result<AnalysisResult, DiagnosisError> {
    let request = build_request(image, config);
    info!(mime = %request.image.mime_type, byte_len = image.byte_len, "diagnosis: request sent");

    let outcome = match tokio::time::timeout(config.timeout, llm.generate(&request)).await {
        Ok(response) => response.map_err(DiagnosisError::from).and_then(|response| {
            info!(
                model = %response.model,
                finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                "diagnosis: response received"
            );
            let text = response
                .text
                .filter(|text| !text.trim().is_empty())
                .ok_or(DiagnosisError::EmptyResponse)?;
            decode_result(&text)
        }),
        Err(_) => Err(DiagnosisError::Timeout(format!("exceeded {}s", config.timeout.as_secs()))),
    };

    match &outcome {
        Ok(result) => info!(urgency = result.urgency.as_str(), "diagnosis: result validated"),
        Err(e) => warn!(code = e.error_code(), error = %e, "diagnosis: failed"),
    }
    outcome
}

// =============================================================================
// DECODING
// =============================================================================

/// Strictly decode backend text into an [`AnalysisResult`].
///
/// # Errors
///
/// [`DiagnosisError::MalformedResponse`] for non-JSON text,
/// [`DiagnosisError::SchemaViolation`] for JSON that breaks the contract.
pub fn decode_result(text: &str) -> Result<AnalysisResult, DiagnosisError> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|e| DiagnosisError::MalformedResponse(e.to_string()))?;
    let object = value.as_object().ok_or(SchemaViolation::NotAnObject)?;

    let field = |name: &'static str| -> Result<String, SchemaViolation> {
        let raw = object.get(name).ok_or(SchemaViolation::MissingField(name))?;
        let text = raw.as_str().ok_or(SchemaViolation::NotAString(name))?;
        if text.trim().is_empty() {
            return Err(SchemaViolation::EmptyField(name));
        }
        Ok(text.to_string())
    };

    let problem_name = field("problemName")?;
    let description = field("description")?;
    let solution = field("solution")?;
    let urgency_raw = field("urgency")?;
    let urgency = Urgency::parse(&urgency_raw).ok_or(SchemaViolation::UnknownUrgency(urgency_raw))?;

    Ok(AnalysisResult { problem_name, description, solution, urgency })
}

#[cfg(test)]
#[path = "diagnosis_test.rs"]
mod tests;
