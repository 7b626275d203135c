//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Optional:
    /// - `LLM_API_KEY_ENV`: names the env var containing the key (default `GEMINI_API_KEY`)
    /// - `LLM_MODEL`: default `gemini-3-flash-preview`
    /// - `LLM_BASE_URL`: default Gemini v1beta endpoint
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when the named key variable is unset
    /// or blank, and [`LlmError::ConfigParse`] for unparseable timeouts.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LlmConfig::from_env`] but reads values through `lookup`.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let key_var = lookup("LLM_API_KEY_ENV").unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
        let api_key = lookup(&key_var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: key_var.clone() })?;

        let model = lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup("LLM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: parse_secs(
                "LLM_REQUEST_TIMEOUT_SECS",
                lookup("LLM_REQUEST_TIMEOUT_SECS"),
                DEFAULT_LLM_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_secs(
                "LLM_CONNECT_TIMEOUT_SECS",
                lookup("LLM_CONNECT_TIMEOUT_SECS"),
                DEFAULT_LLM_CONNECT_TIMEOUT_SECS,
            )?,
        };

        Ok(Self { api_key, model, base_url, timeouts })
    }
}

fn parse_secs(key: &str, raw: Option<String>, default: u64) -> Result<u64, LlmError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(LlmError::ConfigParse(format!("{key} must be a positive integer, got '{value}'"))),
            Ok(secs) => Ok(secs),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
