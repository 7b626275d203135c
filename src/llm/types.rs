//! LLM types: provider-neutral request/response shapes and errors.
//!
//! The diagnosis pipeline only ever sends one multimodal turn (prompt text +
//! one inline image) and expects one JSON text payload back, so the types
//! here are deliberately narrower than a general chat API.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The HTTP client gave up waiting for the provider.
    #[error("API request timed out: {0}")]
    ApiTimeout(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiTimeout(_) => "E_API_TIMEOUT",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest(_) | Self::ApiTimeout(_) | Self::ApiResponse { status: 429 | 500..=599, .. }
        )
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Base64 image bytes tagged with the MIME type the provider should assume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    /// Standard base64, no data-URI prefix.
    pub data: String,
}

/// One multimodal generation request with a declared JSON output schema.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub prompt: String,
    pub image: InlineImage,
    /// Provider-dialect schema the response text must honor.
    pub response_schema: serde_json::Value,
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Response from a vision generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionResponse {
    /// Concatenated text parts of the first candidate. `None` when the
    /// provider returned no text at all.
    pub text: Option<String>,
    pub model: String,
    pub finish_reason: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// VISION TRAIT
// =============================================================================

/// Provider-neutral async trait for image + prompt generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait VisionChat: Send + Sync {
    /// Send a single multimodal request to the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, times out, or the
    /// provider envelope cannot be parsed.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
