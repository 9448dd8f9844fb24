use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn generate() -> Self {
        UserId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// The `users` document. Authoritative for its own relationship sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: UserId,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
    /// Incoming requests, by sender.
    #[serde(default)]
    pub pending_requests: BTreeSet<UserId>,
    /// Outgoing requests, by receiver.
    #[serde(default)]
    pub sent_requests: BTreeSet<UserId>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_microseconds_option")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(uid: UserId, display_name: &str, email: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            uid,
            display_name: display_name.to_owned(),
            email: email.to_owned(),
            photo_url: String::new(),
            friends: BTreeSet::new(),
            pending_requests: BTreeSet::new(),
            sent_requests: BTreeSet::new(),
            created_at,
            last_login: Some(created_at),
        }
    }

    pub fn is_related_to(&self, other: &UserId) -> bool {
        self.friends.contains(other)
            || self.pending_requests.contains(other)
            || self.sent_requests.contains(other)
    }
}
