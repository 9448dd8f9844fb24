use crate::domain_model::{PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// At most one per (post, user), keyed `postId_userId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub post_id: PostId,
    pub user_id: UserId,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn doc_id(post: &PostId, user: UserId) -> String {
        format!("{post}_{user}")
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: u64,
}

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn generate() -> Self {
        CommentId(format!("comment_{}", nanoid::nanoid!()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        CommentId(s.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

/// At most one per (user, post), keyed `userId_postId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPost {
    pub user_id: UserId,
    pub post_id: PostId,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

impl SavedPost {
    pub fn doc_id(user: UserId, post: &PostId) -> String {
        format!("{user}_{post}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_and_save_keys_put_owner_in_different_positions() {
        let user = UserId::generate();
        let post = PostId::from("post_1");
        assert_eq!(Like::doc_id(&post, user), format!("post_1_{user}"));
        assert_eq!(SavedPost::doc_id(user, &post), format!("{user}_post_1"));
    }

    #[test]
    fn generated_comment_ids_are_distinct() {
        assert_ne!(CommentId::generate(), CommentId::generate());
    }
}
