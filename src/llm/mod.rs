//! LLM: Gemini adapter for crop-image diagnosis.
//!
//! DESIGN
//! ======
//! Uses environment variables instead of config files. `LlmClient` owns the
//! provider client plus the model name and implements [`VisionChat`], which
//! is the only seam the diagnosis service depends on.

pub mod config;
pub mod gemini;
pub mod schema;
pub mod types;

use config::LlmConfig;
pub use types::VisionChat;
use types::{LlmError, VisionRequest, VisionResponse};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by the Gemini REST API.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?;
        Ok(Self { inner, model: config.model })
    }

    /// Return the configured model name (e.g. `"gemini-3-flash-preview"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl VisionChat for LlmClient {
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, LlmError> {
        self.inner.generate(&self.model, request).await
    }
}
