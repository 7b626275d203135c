//! Session management: trivial login, cookie tokens, per-session state.
//!
//! ARCHITECTURE
//! ============
//! A login accepts any non-blank name and phone number; nothing is
//! verified. The resulting `User` and that session's analysis controller
//! live in memory under a random token that travels in a cookie. Logout
//! removes the entry and aborts any diagnosis still running for it.
//!
//! Sessions idle for longer than `SESSION_TTL_SECS` expire: a lookup treats
//! them as missing, and every login sweeps expired entries. Expiry drops the
//! held preview image and aborts the running diagnosis, same as logout.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::analysis::{SharedAnalysis, new_shared};
use crate::env::env_parse;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// TYPES
// =============================================================================

/// The farmer behind a session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("name is required")]
    MissingName,
    #[error("phone number is required")]
    MissingPhone,
}

impl crate::error::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingName => "E_MISSING_NAME",
            Self::MissingPhone => "E_MISSING_PHONE",
        }
    }
}

/// Validate login input and build the session user. Values are stored trimmed.
///
/// # Errors
///
/// [`SessionError`] naming the first field that is blank after trimming.
pub fn new_user(name: &str, phone: &str) -> Result<User, SessionError> {
    let name = name.trim();
    let phone = phone.trim();
    if name.is_empty() {
        return Err(SessionError::MissingName);
    }
    if phone.is_empty() {
        return Err(SessionError::MissingPhone);
    }
    Ok(User { id: Uuid::new_v4(), name: name.to_string(), phone: phone.to_string() })
}

// =============================================================================
// STORE
// =============================================================================

/// Everything that belongs to one logged-in browser.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub user: User,
    pub analysis: SharedAnalysis,
}

#[derive(Debug)]
struct Slot {
    entry: SessionEntry,
    last_seen: Instant,
}

/// In-memory token -> session map. Cloning shares the same map.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Slot>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    /// Store whose idle timeout comes from `SESSION_TTL_SECS`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(env_parse("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)))
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    fn is_expired(&self, slot: &Slot, now: Instant) -> bool {
        now.saturating_duration_since(slot.last_seen) > self.ttl
    }

    /// Create a session for `user`, returning its token.
    pub async fn create(&self, user: User) -> String {
        self.create_at(user, Instant::now()).await
    }

    async fn create_at(&self, user: User, now: Instant) -> String {
        let token = generate_token();
        info!(user_id = %user.id, "session: created");
        let entry = SessionEntry { user, analysis: new_shared() };

        let expired = {
            let mut sessions = self.inner.write().await;
            let expired: Vec<String> =
                sessions.iter().filter(|(_, slot)| self.is_expired(slot, now)).map(|(t, _)| t.clone()).collect();
            let expired: Vec<Slot> = expired.iter().filter_map(|t| sessions.remove(t)).collect();
            sessions.insert(token.clone(), Slot { entry, last_seen: now });
            expired
        };
        for slot in expired {
            discard(&slot.entry, "expired").await;
        }
        token
    }

    /// Look up a live session and mark it as seen. Expired tokens are
    /// removed and reported as missing.
    pub async fn get(&self, token: &str) -> Option<SessionEntry> {
        self.get_at(token, Instant::now()).await
    }

    async fn get_at(&self, token: &str, now: Instant) -> Option<SessionEntry> {
        let expired = {
            let mut sessions = self.inner.write().await;
            let slot = sessions.get_mut(token)?;
            if !self.is_expired(slot, now) {
                slot.last_seen = now;
                return Some(slot.entry.clone());
            }
            sessions.remove(token)?
        };
        discard(&expired.entry, "expired").await;
        None
    }

    /// Remove a session and cancel its running analysis. Unknown tokens are a no-op.
    pub async fn remove(&self, token: &str) -> Option<User> {
        let slot = self.inner.write().await.remove(token)?;
        discard(&slot.entry, "removed").await;
        Some(slot.entry.user)
    }
}

async fn discard(entry: &SessionEntry, reason: &'static str) {
    entry.analysis.write().await.reset();
    info!(user_id = %entry.user.id, reason, "session: discarded");
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
