use crate::application_port::{ServiceError, Subscription};
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait EngagementService: Send + Sync {
    // likes

    async fn toggle_like(&self, user: UserId, post: &PostId) -> Result<LikeState, ServiceError>;
    /// Returns the recomputed likes count.
    async fn like_post(&self, user: UserId, post: &PostId) -> Result<u64, ServiceError>;
    async fn unlike_post(&self, user: UserId, post: &PostId) -> Result<u64, ServiceError>;
    async fn is_post_liked(&self, user: UserId, post: &PostId) -> Result<bool, ServiceError>;
    async fn get_post_likes_count(&self, post: &PostId) -> Result<u64, ServiceError>;
    async fn get_post_likes(&self, post: &PostId) -> Result<Vec<Like>, ServiceError>;
    async fn load_like_states(&self, user: UserId, posts: &[PostId]) -> Result<(), ServiceError>;

    // comments

    async fn add_comment(
        &self,
        user: UserId,
        post: &PostId,
        text: &str,
    ) -> Result<Comment, ServiceError>;
    /// Only the author may delete. Returns the recomputed comments count.
    async fn delete_comment(&self, user: UserId, comment: &CommentId)
    -> Result<u64, ServiceError>;
    async fn get_post_comments(&self, post: &PostId) -> Result<Vec<Comment>, ServiceError>;
    async fn get_post_comments_count(&self, post: &PostId) -> Result<u64, ServiceError>;
    async fn subscribe_post_comments(
        &self,
        post: &PostId,
    ) -> Result<Subscription<Comment>, ServiceError>;

    // saved posts

    /// Returns the new saved state.
    async fn toggle_save(&self, user: UserId, post: &PostId) -> Result<bool, ServiceError>;
    async fn save_post(&self, user: UserId, post: &PostId) -> Result<(), ServiceError>;
    async fn unsave_post(&self, user: UserId, post: &PostId) -> Result<(), ServiceError>;
    async fn is_post_saved(&self, user: UserId, post: &PostId) -> Result<bool, ServiceError>;
    async fn get_saved_posts(&self, user: UserId) -> Result<Vec<Post>, ServiceError>;
    async fn get_saved_posts_count(&self, user: UserId) -> Result<u64, ServiceError>;
    async fn load_saved_states(&self, user: UserId, posts: &[PostId])
    -> Result<(), ServiceError>;

    /// Drops the per-session like and save state caches.
    fn clear_cache(&self);
}
