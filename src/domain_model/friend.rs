use crate::domain_model::{User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
}

/// One request per ordered (sender, receiver) pair, keyed `senderId_receiverId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub status: RequestStatus,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_microseconds_option")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    pub fn doc_id(sender: UserId, receiver: UserId) -> String {
        format!("{sender}_{receiver}")
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Directional friendship edge, keyed `ownerId_friendId`. Always written in pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub owner_id: UserId,
    pub friend_id: UserId,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn doc_id(owner: UserId, friend: UserId) -> String {
        format!("{owner}_{friend}")
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Friends,
    RequestSent,
    RequestReceived,
    None,
}

impl FriendshipStatus {
    /// Checked in priority order: friends, sent, received.
    pub fn between(user: &User, other: &UserId) -> Self {
        if user.friends.contains(other) {
            FriendshipStatus::Friends
        } else if user.sent_requests.contains(other) {
            FriendshipStatus::RequestSent
        } else if user.pending_requests.contains(other) {
            FriendshipStatus::RequestReceived
        } else {
            FriendshipStatus::None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub request: FriendRequest,
    pub sender: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_ordered() {
        let a = UserId::generate();
        let b = UserId::generate();
        assert_eq!(FriendRequest::doc_id(a, b), format!("{a}_{b}"));
        assert_ne!(FriendRequest::doc_id(a, b), FriendRequest::doc_id(b, a));
    }

    #[test]
    fn status_prefers_friends_over_requests() {
        let me = UserId::generate();
        let other = UserId::generate();
        let mut user = User::new(me, "me", "me@example.com", Utc::now());
        assert_eq!(FriendshipStatus::between(&user, &other), FriendshipStatus::None);

        user.pending_requests.insert(other);
        assert_eq!(
            FriendshipStatus::between(&user, &other),
            FriendshipStatus::RequestReceived
        );

        user.sent_requests.insert(other);
        assert_eq!(FriendshipStatus::between(&user, &other), FriendshipStatus::RequestSent);

        user.friends.insert(other);
        assert_eq!(FriendshipStatus::between(&user, &other), FriendshipStatus::Friends);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(FriendshipStatus::RequestSent).unwrap();
        assert_eq!(json, serde_json::json!("request_sent"));
    }
}
