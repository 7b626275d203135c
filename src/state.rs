//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the session store (each session owning its analysis state),
//! the forum, and the optional diagnosis backend. Nothing here is persisted.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::llm::VisionChat;
use crate::services::diagnosis::DiagnosisConfig;
use crate::services::forum::Forum;
use crate::services::session::SessionStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub forum: Arc<RwLock<Forum>>,
    /// Optional diagnosis backend. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn VisionChat>>,
    pub diagnosis: DiagnosisConfig,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn VisionChat>>, diagnosis: DiagnosisConfig) -> Self {
        Self { sessions: SessionStore::new(), forum: Arc::new(RwLock::new(Forum::seeded())), llm, diagnosis }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
