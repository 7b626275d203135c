use super::*;

use std::time::{Duration, Instant};

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// new_user
// =============================================================================

#[test]
fn new_user_trims_fields() {
    let user = new_user("  করিম শেখ ", " ০১৭১১০০০০০০\n").unwrap();
    assert_eq!(user.name, "করিম শেখ");
    assert_eq!(user.phone, "০১৭১১০০০০০০");
}

#[test]
fn new_user_rejects_blank_name() {
    assert_eq!(new_user("   ", "01711000000"), Err(SessionError::MissingName));
}

#[test]
fn new_user_rejects_blank_phone() {
    let err = new_user("Karim", "\t").unwrap_err();
    assert_eq!(err, SessionError::MissingPhone);
    assert_eq!(crate::error::ErrorCode::error_code(&err), "E_MISSING_PHONE");
}

#[test]
fn new_user_ids_are_unique() {
    let a = new_user("a", "1").unwrap();
    let b = new_user("a", "1").unwrap();
    assert_ne!(a.id, b.id);
}

// =============================================================================
// SessionStore
// =============================================================================

#[tokio::test]
async fn create_then_get_returns_user() {
    let store = SessionStore::new();
    let user = new_user("Karim", "01711000000").unwrap();
    let token = store.create(user.clone()).await;
    let entry = store.get(&token).await.unwrap();
    assert_eq!(entry.user, user);
    assert_eq!(entry.analysis.read().await.snapshot().phase, "idle");
}

#[tokio::test]
async fn unknown_token_is_none() {
    assert!(SessionStore::new().get("nope").await.is_none());
}

#[tokio::test]
async fn sessions_are_isolated() {
    let store = SessionStore::new();
    let a = store.create(new_user("a", "1").unwrap()).await;
    let b = store.create(new_user("b", "2").unwrap()).await;
    assert_ne!(a, b);

    let entry_a = store.get(&a).await.unwrap();
    entry_a.analysis.write().await.select("data:image/png;base64,AAAA").unwrap();

    let entry_b = store.get(&b).await.unwrap();
    assert_eq!(entry_b.analysis.read().await.snapshot().phase, "idle");
}

#[tokio::test]
async fn remove_discards_session_and_aborts_analysis() {
    let store = SessionStore::new();
    let token = store.create(new_user("a", "1").unwrap()).await;
    let entry = store.get(&token).await.unwrap();

    let task = start_pending_analysis(&entry).await;

    let removed = store.remove(&token).await.unwrap();
    assert_eq!(removed.name, "a");
    assert!(store.get(&token).await.is_none());
    assert!(task.await.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn remove_unknown_token_is_noop() {
    assert!(SessionStore::new().remove("nope").await.is_none());
}

// =============================================================================
// expiry
// =============================================================================

const TTL: Duration = Duration::from_secs(60);

async fn start_pending_analysis(entry: &SessionEntry) -> tokio::task::JoinHandle<()> {
    let task = tokio::spawn(std::future::pending::<()>());
    let mut session = entry.analysis.write().await;
    let id = session.select("data:image/png;base64,AAAA").unwrap();
    session.dispatch(id, Some(task.abort_handle())).unwrap();
    task
}

#[tokio::test]
async fn idle_session_expires_and_aborts_analysis() {
    let store = SessionStore::with_ttl(TTL);
    let t0 = Instant::now();
    let token = store.create_at(new_user("a", "1").unwrap(), t0).await;
    let task = start_pending_analysis(&store.get_at(&token, t0).await.unwrap()).await;

    assert!(store.get_at(&token, t0 + TTL + Duration::from_secs(1)).await.is_none());
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(store.get_at(&token, t0).await.is_none(), "expired entry must be gone for good");
}

#[tokio::test]
async fn activity_keeps_session_alive() {
    let store = SessionStore::with_ttl(TTL);
    let t0 = Instant::now();
    let token = store.create_at(new_user("a", "1").unwrap(), t0).await;

    assert!(store.get_at(&token, t0 + Duration::from_secs(50)).await.is_some());
    assert!(store.get_at(&token, t0 + Duration::from_secs(100)).await.is_some());
}

#[tokio::test]
async fn login_sweeps_expired_sessions() {
    let store = SessionStore::with_ttl(TTL);
    let t0 = Instant::now();
    let stale = store.create_at(new_user("a", "1").unwrap(), t0).await;
    let task = start_pending_analysis(&store.get_at(&stale, t0).await.unwrap()).await;

    let fresh = store.create_at(new_user("b", "2").unwrap(), t0 + TTL * 2).await;
    assert_eq!(store.inner.read().await.len(), 1);
    assert!(store.inner.read().await.contains_key(&fresh));
    assert!(task.await.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn default_store_uses_day_long_ttl() {
    assert_eq!(SessionStore::default().ttl, Duration::from_secs(DEFAULT_SESSION_TTL_SECS));
}
