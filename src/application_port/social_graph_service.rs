use crate::application_port::ServiceError;
use crate::domain_model::*;

/// Friend-request lifecycle and friendship edges.
///
/// Multi-document operations are sequences of independent writes. A failure
/// part way is reported, and the writes that already landed stay applied.
#[async_trait::async_trait]
pub trait SocialGraphService: Send + Sync {
    /// Creates a pending request and records it on both users.
    async fn send_friend_request(&self, sender: UserId, receiver: UserId)
    -> Result<(), ServiceError>;

    /// Requires a pending `sender -> accepter` request.
    async fn accept_friend_request(
        &self,
        accepter: UserId,
        sender: UserId,
    ) -> Result<(), ServiceError>;

    /// Requires a pending `sender -> rejecter` request; a second reject is `NotFound`.
    async fn reject_friend_request(
        &self,
        rejecter: UserId,
        sender: UserId,
    ) -> Result<(), ServiceError>;

    async fn remove_friend(&self, user: UserId, friend: UserId) -> Result<(), ServiceError>;

    /// Friends whose record cannot be read are skipped.
    async fn get_friends_list(&self, user: UserId) -> Result<Vec<User>, ServiceError>;

    async fn get_pending_requests(&self, user: UserId)
    -> Result<Vec<PendingRequest>, ServiceError>;

    async fn get_friend_suggestions(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<User>, ServiceError>;

    async fn get_friendship_status(
        &self,
        user: UserId,
        other: UserId,
    ) -> Result<FriendshipStatus, ServiceError>;
}
