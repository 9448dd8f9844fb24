use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn generate() -> Self {
        PostId(format!("post_{}", nanoid::nanoid!()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        PostId(s.to_owned())
    }
}

/// `likes_count` and `comments_count` are recomputed from the like and comment
/// records after every mutation, never incremented in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub comments_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostCounts {
    pub likes_count: Option<u64>,
    pub comments_count: Option<u64>,
}

impl PostCounts {
    pub fn likes(count: u64) -> Self {
        Self {
            likes_count: Some(count),
            comments_count: None,
        }
    }

    pub fn comments(count: u64) -> Self {
        Self {
            likes_count: None,
            comments_count: Some(count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.likes_count.is_none() && self.comments_count.is_none()
    }
}
