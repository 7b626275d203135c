//! Auth routes: name + phone login, session cookie, logout.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use super::error_response;
use crate::env::env_bool;
use crate::services::analysis::SharedAnalysis;
use crate::services::session::{self, SessionError, User};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

pub(crate) fn session_error_to_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::MissingName | SessionError::MissingPhone => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Logged-in farmer extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
    pub token: String,
    pub analysis: SharedAnalysis,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let entry = app_state.sessions.get(token).await.ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(Self { user: entry.user, token: token.to_owned(), analysis: entry.analysis })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub name: String,
    pub phone: String,
}

/// `POST /api/auth/login`: start a session for any non-blank name and phone.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Result<impl IntoResponse, Response> {
    let user = session::new_user(&body.name, &body.phone)
        .map_err(|e| error_response(session_error_to_status(&e), &e))?;
    let token = state.sessions.create(user.clone()).await;

    let jar = CookieJar::new().add(session_cookie(token));
    Ok((StatusCode::CREATED, jar, Json(user)))
}

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

/// `POST /api/auth/logout`: drop the session and its analysis, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    state.sessions.remove(&auth.token).await;
    let jar = CookieJar::new().add(cleared_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
