use crate::application_port::{ServiceError, Subscription};
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait FeedService: Send + Sync {
    async fn create_post(&self, author: UserId, text: &str) -> Result<Post, ServiceError>;
    /// Only the author may delete. Likes, comments and saves are left in place.
    async fn delete_post(&self, user: UserId, post: &PostId) -> Result<(), ServiceError>;
    async fn get_post(&self, post: &PostId) -> Result<Post, ServiceError>;
    /// Newest first.
    async fn get_all_posts(&self) -> Result<Vec<Post>, ServiceError>;
    async fn get_user_posts(&self, author: UserId) -> Result<Vec<Post>, ServiceError>;
    /// Newest first, redelivered in full on every post change.
    async fn subscribe_feed(&self) -> Result<Subscription<Post>, ServiceError>;
    async fn update_post_counts(&self, post: &PostId, counts: PostCounts)
    -> Result<(), ServiceError>;
}
