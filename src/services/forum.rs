//! Community forum: posts with append-only replies, in memory.
//!
//! Posts are kept most-recent-first; a new post is prepended. Nothing is
//! edited or deleted once written, and everything is lost on restart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumReply {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: Uuid,
    pub author: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub replies: Vec<ForumReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForumError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
}

impl crate::error::ErrorCode for ForumError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyField(_) => "E_EMPTY_FIELD",
            Self::PostNotFound(_) => "E_POST_NOT_FOUND",
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ForumError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ForumError::EmptyField(field));
    }
    Ok(value.to_string())
}

// =============================================================================
// FORUM
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Forum {
    posts: Vec<ForumPost>,
}

impl Forum {
    /// A forum holding the welcome discussion every new install starts with.
    #[must_use]
    pub fn seeded() -> Self {
        let now = Utc::now();
        let post = ForumPost {
            id: Uuid::new_v4(),
            author: "করিম শেখ".into(),
            title: "ধানের পাতা হলুদ হয়ে যাচ্ছে".into(),
            content: "আমার ধানের জমিতে অনেক ধানের পাতার ডগা হলুদ হয়ে শুকিয়ে যাচ্ছে। কেউ কি এর সমাধান জানেন?".into(),
            image_url: None,
            timestamp: now,
            replies: vec![ForumReply {
                id: Uuid::new_v4(),
                author: "কৃষিবিদ রুবেল".into(),
                content: "সম্ভবত পটাশ সারের অভাব। ৫ শতাংশ জমিতে ১ কেজি করে পটাশ প্রয়োগ করে দেখুন।".into(),
                timestamp: now,
            }],
        };
        Self { posts: vec![post] }
    }

    /// Posts, most recent first.
    #[must_use]
    pub fn posts(&self) -> &[ForumPost] {
        &self.posts
    }

    /// Publish a new post at the top of the list.
    ///
    /// # Errors
    ///
    /// [`ForumError::EmptyField`] if title or content is blank.
    pub fn create_post(
        &mut self,
        author: &str,
        title: &str,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<ForumPost, ForumError> {
        let title = required("title", title)?;
        let content = required("content", content)?;
        let image_url = image_url.map(str::trim).filter(|url| !url.is_empty()).map(str::to_string);

        let post = ForumPost {
            id: Uuid::new_v4(),
            author: author.to_string(),
            title,
            content,
            image_url,
            timestamp: Utc::now(),
            replies: Vec::new(),
        };
        info!(post_id = %post.id, "forum: post created");
        self.posts.insert(0, post.clone());
        Ok(post)
    }

    /// Append a reply to an existing post.
    ///
    /// # Errors
    ///
    /// [`ForumError::EmptyField`] for blank content, [`ForumError::PostNotFound`]
    /// for an unknown post id.
    pub fn add_reply(&mut self, post_id: Uuid, author: &str, content: &str) -> Result<ForumReply, ForumError> {
        let content = required("content", content)?;
        let post = self.posts.iter_mut().find(|p| p.id == post_id).ok_or(ForumError::PostNotFound(post_id))?;

        let reply = ForumReply { id: Uuid::new_v4(), author: author.to_string(), content, timestamp: Utc::now() };
        post.replies.push(reply.clone());
        info!(%post_id, reply_id = %reply.id, "forum: reply added");
        Ok(reply)
    }
}

#[cfg(test)]
#[path = "forum_test.rs"]
mod tests;
