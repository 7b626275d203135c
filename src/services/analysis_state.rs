//! Per-session analysis state machine.
//!
//! DESIGN
//! ======
//! `reduce` is a pure function from the current state and one event to the
//! next state. `AnalysisSession` owns a state plus the abort handle of the
//! backend call it started, and is the only writer of that state.
//!
//! Every new image selection takes the next request id from a monotonic
//! counter. A completion is applied only while the session is analyzing
//! that same id; anything else is stale and dropped. Reset is a single
//! transition, so preview and result/error are always cleared together.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::AbortHandle;

use super::diagnosis::AnalysisResult;
use super::render::{DiagnosisView, render};
use crate::error::ErrorCode;
use crate::locale;

// =============================================================================
// STATE
// =============================================================================

/// Failure shown to the farmer: internal code plus localized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub code: &'static str,
    pub message: String,
}

impl Failure {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.user_message() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    PreviewReady { request_id: u64, preview: Arc<str> },
    Analyzing { request_id: u64, preview: Arc<str> },
    Success { preview: Arc<str>, result: AnalysisResult },
    Failed { preview: Arc<str>, failure: Failure },
}

impl AnalysisPhase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PreviewReady { .. } => "previewReady",
            Self::Analyzing { .. } => "analyzing",
            Self::Success { .. } => "success",
            Self::Failed { .. } => "failed",
        }
    }

    /// A request is pending from selection until its completion.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::PreviewReady { .. } | Self::Analyzing { .. })
    }

    #[must_use]
    pub fn preview(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::PreviewReady { preview, .. }
            | Self::Analyzing { preview, .. }
            | Self::Success { preview, .. }
            | Self::Failed { preview, .. } => Some(&**preview),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisState {
    pub phase: AnalysisPhase,
    /// Id handed to the most recent selection; 0 before the first one.
    pub last_request_id: u64,
}

impl AnalysisState {
    #[must_use]
    pub fn new() -> Self {
        Self { phase: AnalysisPhase::Idle, last_request_id: 0 }
    }
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// An image was encoded; its preview replaces whatever was shown.
    Selected { preview: Arc<str> },
    Dispatched { request_id: u64 },
    Completed { request_id: u64, outcome: Result<AnalysisResult, Failure> },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("an analysis is already in progress")]
    Busy,
    #[error("request {request_id} is no longer active")]
    Stale { request_id: u64 },
    #[error("event `{event}` is not valid in phase `{phase}`")]
    InvalidTransition { phase: &'static str, event: &'static str },
}

impl ErrorCode for TransitionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => "E_ANALYSIS_BUSY",
            Self::Stale { .. } => "E_STALE_RESPONSE",
            Self::InvalidTransition { .. } => "E_INVALID_TRANSITION",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }

    fn user_message(&self) -> String {
        match self {
            Self::Busy => locale::ANALYSIS_BUSY.to_string(),
            _ => locale::ANALYSIS_FAILED.to_string(),
        }
    }
}

// =============================================================================
// REDUCER
// =============================================================================

/// Compute the state that follows `event`. `state` is never modified.
///
/// # Errors
///
/// - [`TransitionError::Busy`] for a selection while a request is pending.
/// - [`TransitionError::Stale`] for a dispatch or completion whose id is not
///   the active request.
/// - [`TransitionError::InvalidTransition`] for a dispatch outside
///   `PreviewReady`.
pub fn reduce(state: &AnalysisState, event: AnalysisEvent) -> Result<AnalysisState, TransitionError> {
    match event {
        AnalysisEvent::Selected { preview } => {
            if state.phase.is_busy() {
                return Err(TransitionError::Busy);
            }
            let request_id = state.last_request_id + 1;
            Ok(AnalysisState { phase: AnalysisPhase::PreviewReady { request_id, preview }, last_request_id: request_id })
        }
        AnalysisEvent::Dispatched { request_id } => match &state.phase {
            AnalysisPhase::PreviewReady { request_id: active, preview } if *active == request_id => Ok(AnalysisState {
                phase: AnalysisPhase::Analyzing { request_id, preview: Arc::clone(preview) },
                last_request_id: state.last_request_id,
            }),
            AnalysisPhase::PreviewReady { .. } => Err(TransitionError::Stale { request_id }),
            phase => Err(TransitionError::InvalidTransition { phase: phase.name(), event: "dispatched" }),
        },
        AnalysisEvent::Completed { request_id, outcome } => match &state.phase {
            AnalysisPhase::Analyzing { request_id: active, preview } if *active == request_id => {
                let preview = Arc::clone(preview);
                let phase = match outcome {
                    Ok(result) => AnalysisPhase::Success { preview, result },
                    Err(failure) => AnalysisPhase::Failed { preview, failure },
                };
                Ok(AnalysisState { phase, last_request_id: state.last_request_id })
            }
            _ => Err(TransitionError::Stale { request_id }),
        },
        AnalysisEvent::Reset => Ok(AnalysisState { phase: AnalysisPhase::Idle, last_request_id: state.last_request_id }),
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Render-ready view of one session, as served to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub phase: &'static str,
    pub loading: bool,
    pub capture_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DiagnosisView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl AnalysisSnapshot {
    #[must_use]
    pub fn of(state: &AnalysisState) -> Self {
        let busy = state.phase.is_busy();
        let (result, error) = match &state.phase {
            AnalysisPhase::Success { result, .. } => (Some(render(result)), None),
            AnalysisPhase::Failed { failure, .. } => (None, Some(failure.clone())),
            _ => (None, None),
        };
        Self {
            phase: state.phase.name(),
            loading: busy,
            capture_enabled: !busy,
            preview: state.phase.preview().map(str::to_string),
            result,
            error,
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns one session's state and the handle of its running backend call.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    state: AnalysisState,
    task: Option<AbortHandle>,
}

impl AnalysisSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot::of(&self.state)
    }

    fn apply(&mut self, event: AnalysisEvent) -> Result<(), TransitionError> {
        self.state = reduce(&self.state, event)?;
        Ok(())
    }

    /// Accept a new image and return the request id it will run under.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Busy`] while a previous image is pending.
    pub fn select(&mut self, preview: impl Into<Arc<str>>) -> Result<u64, TransitionError> {
        self.apply(AnalysisEvent::Selected { preview: preview.into() })?;
        Ok(self.state.last_request_id)
    }

    /// Mark `request_id` as sent and remember how to cancel it.
    ///
    /// # Errors
    ///
    /// Stale or invalid when `request_id` is not the selection awaiting dispatch.
    pub fn dispatch(&mut self, request_id: u64, task: Option<AbortHandle>) -> Result<(), TransitionError> {
        self.apply(AnalysisEvent::Dispatched { request_id })?;
        self.task = task;
        Ok(())
    }

    /// Apply the outcome of `request_id`.
    ///
    /// # Errors
    ///
    /// [`TransitionError::Stale`] when the session moved on; the state is untouched.
    pub fn complete(&mut self, request_id: u64, outcome: Result<AnalysisResult, Failure>) -> Result<(), TransitionError> {
        self.apply(AnalysisEvent::Completed { request_id, outcome })?;
        self.task = None;
        Ok(())
    }

    /// Cancel any running call and return to `Idle`.
    pub fn reset(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Reset is accepted in every phase.
        let _ = self.apply(AnalysisEvent::Reset);
    }
}

#[cfg(test)]
#[path = "analysis_state_test.rs"]
mod tests;
