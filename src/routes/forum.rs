//! Forum routes: list, post, reply.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use super::auth::AuthUser;
use super::error_response;
use crate::services::forum::{ForumError, ForumPost, ForumReply};
use crate::state::AppState;

pub(crate) fn forum_error_to_status(err: &ForumError) -> StatusCode {
    match err {
        ForumError::EmptyField(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ForumError::PostNotFound(_) => StatusCode::NOT_FOUND,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    pub content: String,
}

/// `GET /api/forum/posts`: most recent first.
pub async fn list_posts(State(state): State<AppState>) -> Json<Vec<ForumPost>> {
    Json(state.forum.read().await.posts().to_vec())
}

/// `POST /api/forum/posts`: new post authored by the session user.
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePostBody>,
) -> Result<(StatusCode, Json<ForumPost>), Response> {
    let post = state
        .forum
        .write()
        .await
        .create_post(&auth.user.name, &body.title, &body.content, body.image_url.as_deref())
        .map_err(|e| error_response(forum_error_to_status(&e), &e))?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// `POST /api/forum/posts/{id}/replies`: append a reply.
pub async fn add_reply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(body): Json<ReplyBody>,
) -> Result<(StatusCode, Json<ForumReply>), Response> {
    let reply = state
        .forum
        .write()
        .await
        .add_reply(post_id, &auth.user.name, &body.content)
        .map_err(|e| error_response(forum_error_to_status(&e), &e))?;
    Ok((StatusCode::CREATED, Json(reply)))
}

#[cfg(test)]
#[path = "forum_test.rs"]
mod tests;
