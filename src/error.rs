//! Error codes shared by every service error type.
//!
//! DESIGN
//! ======
//! Each service owns a `thiserror` enum. The HTTP layer never inspects the
//! variants directly; it asks for a grepable code, a retryable flag and a
//! user-facing message, and serializes them as a flat JSON body.

use serde::Serialize;

/// Grepable error code + retry hint for service errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }

    /// Text safe to show to the farmer. Defaults to the `Display` output;
    /// errors that may carry backend detail override it.
    fn user_message(&self) -> String {
        self.to_string()
    }
}

/// JSON body returned alongside non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.user_message(), retryable: err.retryable() }
    }
}
