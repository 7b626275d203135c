//! Analysis service: encoded photo, background diagnosis, session state.
//!
//! DESIGN
//! ======
//! `start` selects and dispatches under one write lock, spawns the backend
//! call, and returns immediately with the `Analyzing` snapshot. The spawned
//! task takes the lock again only to apply its outcome, tagged with the
//! request id it was started for, so a reset or logout that happened in
//! between turns the outcome into a dropped stale completion.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::analysis_state::{AnalysisSession, AnalysisSnapshot, Failure, TransitionError};
use super::capture::EncodedImage;
use super::diagnosis::{self, DiagnosisConfig, DiagnosisError};
use crate::error::ErrorCode;
use crate::llm::VisionChat;

/// One session's analysis controller, shared with its background task.
pub type SharedAnalysis = Arc<RwLock<AnalysisSession>>;

#[must_use]
pub fn new_shared() -> SharedAnalysis {
    Arc::new(RwLock::new(AnalysisSession::new()))
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl ErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Diagnosis(e) => e.error_code(),
            Self::Transition(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Diagnosis(e) => e.retryable(),
            Self::Transition(e) => e.retryable(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Diagnosis(e) => e.user_message(),
            Self::Transition(e) => e.user_message(),
        }
    }
}

/// Accept `image` for diagnosis and start the backend call in the background.
///
/// # Errors
///
/// - [`DiagnosisError::NotConfigured`] when no backend is available.
/// - [`TransitionError::Busy`] while a previous image is still pending.
pub async fn start(
    analysis: &SharedAnalysis,
    llm: Option<Arc<dyn VisionChat>>,
    config: DiagnosisConfig,
    image: EncodedImage,
) -> Result<AnalysisSnapshot, AnalysisError> {
    let llm = llm.ok_or(DiagnosisError::NotConfigured)?;

    let mut session = analysis.write().await;
    let request_id = session.select(image.preview.as_str())?;

    let task_analysis = Arc::clone(analysis);
    let task = tokio::spawn(async move {
        let outcome = diagnosis::analyze(&llm, &config, &image).await.map_err(|e| Failure::from_error(&e));
        let mut session = task_analysis.write().await;
        match session.complete(request_id, outcome) {
            Ok(()) => info!(request_id, phase = session.state().phase.name(), "analysis: completed"),
            Err(e) => debug!(request_id, error = %e, "analysis: completion dropped"),
        }
    });

    if let Err(e) = session.dispatch(request_id, Some(task.abort_handle())) {
        task.abort();
        return Err(e.into());
    }
    info!(request_id, "analysis: dispatched");
    Ok(session.snapshot())
}

pub async fn snapshot(analysis: &SharedAnalysis) -> AnalysisSnapshot {
    analysis.read().await.snapshot()
}

/// Abort any running call and clear preview, result and error.
pub async fn reset(analysis: &SharedAnalysis) -> AnalysisSnapshot {
    let mut session = analysis.write().await;
    session.reset();
    info!(last_request_id = session.state().last_request_id, "analysis: reset");
    session.snapshot()
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
