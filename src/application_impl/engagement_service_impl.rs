use crate::application_port::{
    EngagementService, FeedService, ServiceError, Subscription, require_text,
};
use crate::domain_model::*;
use crate::domain_port::collections::{
    COMMENTS, LIKES, SAVED_POSTS, USERS, from_document, to_document, to_value,
};
use crate::domain_port::{DocumentStore, Filter, OrderBy, Query, StoreError};
use dashmap::DashMap;
use std::sync::Arc;

type StateCache = DashMap<(UserId, PostId), bool>;

/// Likes, comments and saved posts for one session.
///
/// Like and save state is memoized per (user, post) after the first lookup and
/// overwritten before any mutating call returns. Counters on the post are always
/// recomputed from the like and comment records.
pub struct RealEngagementService {
    store: Arc<dyn DocumentStore>,
    feed: Arc<dyn FeedService>,
    liked: StateCache,
    saved: StateCache,
}

impl RealEngagementService {
    pub fn new(store: Arc<dyn DocumentStore>, feed: Arc<dyn FeedService>) -> Self {
        Self {
            store,
            feed,
            liked: DashMap::new(),
            saved: DashMap::new(),
        }
    }

    async fn exists(&self, collection: &str, id: &str) -> Result<bool, ServiceError> {
        match self.store.get_document(collection, id).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self, collection: &str, post: &PostId) -> Result<u64, ServiceError> {
        let query = Query::new().filter(Filter::eq("postId", post.as_str()));
        let docs = self.store.query_documents(collection, &query).await?;
        Ok(docs.len() as u64)
    }

    /// Stores `counts` on the post. A post deleted in the meantime keeps no counter.
    async fn store_counts(&self, post: &PostId, counts: PostCounts) -> Result<(), ServiceError> {
        match self.feed.update_post_counts(post, counts).await {
            Err(ServiceError::NotFound(_)) => {
                tracing::debug!(%post, "post gone, counter not stored");
                Ok(())
            }
            other => other,
        }
    }

    async fn refresh_likes_count(&self, post: &PostId) -> Result<u64, ServiceError> {
        let count = self.count(LIKES, post).await?;
        self.store_counts(post, PostCounts::likes(count)).await?;
        Ok(count)
    }

    async fn refresh_comments_count(&self, post: &PostId) -> Result<u64, ServiceError> {
        let count = self.count(COMMENTS, post).await?;
        self.store_counts(post, PostCounts::comments(count)).await?;
        Ok(count)
    }

    fn comments_query(post: &PostId) -> Query {
        Query::new()
            .filter(Filter::eq("postId", post.as_str()))
            .order_by(OrderBy::asc("createdAt"))
    }
}

#[async_trait::async_trait]
impl EngagementService for RealEngagementService {
    async fn toggle_like(&self, user: UserId, post: &PostId) -> Result<LikeState, ServiceError> {
        if self.is_post_liked(user, post).await? {
            let likes_count = self.unlike_post(user, post).await?;
            Ok(LikeState {
                liked: false,
                likes_count,
            })
        } else {
            let likes_count = self.like_post(user, post).await?;
            Ok(LikeState {
                liked: true,
                likes_count,
            })
        }
    }

    async fn like_post(&self, user: UserId, post: &PostId) -> Result<u64, ServiceError> {
        self.feed.get_post(post).await?;

        let like_id = Like::doc_id(post, user);
        if self.exists(LIKES, &like_id).await? {
            self.liked.insert((user, post.clone()), true);
            return Err(ServiceError::AlreadyLiked);
        }

        let like = Like {
            post_id: post.clone(),
            user_id: user,
            created_at: self.store.server_timestamp(),
        };
        self.store
            .set_document(LIKES, &like_id, to_document(&like)?)
            .await?;
        self.liked.insert((user, post.clone()), true);

        let count = self.refresh_likes_count(post).await?;
        tracing::debug!(%user, %post, count, "post liked");
        Ok(count)
    }

    async fn unlike_post(&self, user: UserId, post: &PostId) -> Result<u64, ServiceError> {
        self.store
            .delete_document(LIKES, &Like::doc_id(post, user))
            .await?;
        self.liked.insert((user, post.clone()), false);

        let count = self.refresh_likes_count(post).await?;
        tracing::debug!(%user, %post, count, "post unliked");
        Ok(count)
    }

    async fn is_post_liked(&self, user: UserId, post: &PostId) -> Result<bool, ServiceError> {
        if let Some(liked) = self.liked.get(&(user, post.clone())) {
            return Ok(*liked);
        }
        let liked = self.exists(LIKES, &Like::doc_id(post, user)).await?;
        self.liked.insert((user, post.clone()), liked);
        Ok(liked)
    }

    async fn get_post_likes_count(&self, post: &PostId) -> Result<u64, ServiceError> {
        self.count(LIKES, post).await
    }

    async fn get_post_likes(&self, post: &PostId) -> Result<Vec<Like>, ServiceError> {
        let query = Query::new()
            .filter(Filter::eq("postId", post.as_str()))
            .order_by(OrderBy::asc("createdAt"));
        let docs = self.store.query_documents(LIKES, &query).await?;
        let mut likes = Vec::with_capacity(docs.len());
        for doc in docs {
            likes.push(from_document(doc)?);
        }
        Ok(likes)
    }

    async fn load_like_states(&self, user: UserId, posts: &[PostId]) -> Result<(), ServiceError> {
        for post in posts {
            self.is_post_liked(user, post).await?;
        }
        Ok(())
    }

    async fn add_comment(
        &self,
        user: UserId,
        post: &PostId,
        text: &str,
    ) -> Result<Comment, ServiceError> {
        require_text("comment", text)?;
        self.feed.get_post(post).await?;
        let author: User = from_document(self.store.get_document(USERS, &user.to_string()).await?)?;

        let comment = Comment {
            id: CommentId::generate(),
            post_id: post.clone(),
            author_id: user,
            author_name: author.display_name,
            text: text.to_owned(),
            created_at: self.store.server_timestamp(),
        };
        self.store
            .set_document(COMMENTS, comment.id.as_str(), to_document(&comment)?)
            .await?;

        let count = self.refresh_comments_count(post).await?;
        tracing::debug!(%user, %post, count, "comment added");
        Ok(comment)
    }

    async fn delete_comment(
        &self,
        user: UserId,
        comment: &CommentId,
    ) -> Result<u64, ServiceError> {
        let existing: Comment = match self.store.get_document(COMMENTS, comment.as_str()).await {
            Ok(doc) => from_document(doc)?,
            Err(StoreError::NotFound { .. }) => {
                return Err(ServiceError::NotFound(format!("comment {comment}")));
            }
            Err(e) => return Err(e.into()),
        };
        if existing.author_id != user {
            return Err(ServiceError::Unauthorized(
                "only the author can delete this comment".to_owned(),
            ));
        }

        self.store
            .delete_document(COMMENTS, comment.as_str())
            .await?;
        let count = self.refresh_comments_count(&existing.post_id).await?;
        tracing::debug!(%user, %comment, count, "comment deleted");
        Ok(count)
    }

    async fn get_post_comments(&self, post: &PostId) -> Result<Vec<Comment>, ServiceError> {
        let docs = self
            .store
            .query_documents(COMMENTS, &Self::comments_query(post))
            .await?;
        let mut comments = Vec::with_capacity(docs.len());
        for doc in docs {
            comments.push(from_document(doc)?);
        }
        Ok(comments)
    }

    async fn get_post_comments_count(&self, post: &PostId) -> Result<u64, ServiceError> {
        self.count(COMMENTS, post).await
    }

    async fn subscribe_post_comments(
        &self,
        post: &PostId,
    ) -> Result<Subscription<Comment>, ServiceError> {
        let live = self
            .store
            .subscribe(COMMENTS, Self::comments_query(post))
            .await?;
        Ok(Subscription::new(live))
    }

    async fn toggle_save(&self, user: UserId, post: &PostId) -> Result<bool, ServiceError> {
        if self.is_post_saved(user, post).await? {
            self.unsave_post(user, post).await?;
            Ok(false)
        } else {
            self.save_post(user, post).await?;
            Ok(true)
        }
    }

    async fn save_post(&self, user: UserId, post: &PostId) -> Result<(), ServiceError> {
        self.feed.get_post(post).await?;

        let saved_id = SavedPost::doc_id(user, post);
        if self.exists(SAVED_POSTS, &saved_id).await? {
            self.saved.insert((user, post.clone()), true);
            return Err(ServiceError::AlreadySaved);
        }

        let saved = SavedPost {
            user_id: user,
            post_id: post.clone(),
            created_at: self.store.server_timestamp(),
        };
        self.store
            .set_document(SAVED_POSTS, &saved_id, to_document(&saved)?)
            .await?;
        self.saved.insert((user, post.clone()), true);
        Ok(())
    }

    async fn unsave_post(&self, user: UserId, post: &PostId) -> Result<(), ServiceError> {
        self.store
            .delete_document(SAVED_POSTS, &SavedPost::doc_id(user, post))
            .await?;
        self.saved.insert((user, post.clone()), false);
        Ok(())
    }

    async fn is_post_saved(&self, user: UserId, post: &PostId) -> Result<bool, ServiceError> {
        if let Some(saved) = self.saved.get(&(user, post.clone())) {
            return Ok(*saved);
        }
        let saved = self
            .exists(SAVED_POSTS, &SavedPost::doc_id(user, post))
            .await?;
        self.saved.insert((user, post.clone()), saved);
        Ok(saved)
    }

    async fn get_saved_posts(&self, user: UserId) -> Result<Vec<Post>, ServiceError> {
        let query = Query::new()
            .filter(Filter::eq("userId", to_value(&user)?))
            .order_by(OrderBy::desc("createdAt"));
        let docs = self.store.query_documents(SAVED_POSTS, &query).await?;

        let mut posts = Vec::with_capacity(docs.len());
        for doc in docs {
            let saved: SavedPost = from_document(doc)?;
            self.saved.insert((user, saved.post_id.clone()), true);
            match self.feed.get_post(&saved.post_id).await {
                Ok(post) => posts.push(post),
                Err(ServiceError::NotFound(_)) => {
                    tracing::debug!(post = %saved.post_id, "saved post no longer exists");
                }
                Err(e) => tracing::warn!(post = %saved.post_id, "skipping saved post: {e}"),
            }
        }
        Ok(posts)
    }

    async fn get_saved_posts_count(&self, user: UserId) -> Result<u64, ServiceError> {
        let query = Query::new().filter(Filter::eq("userId", to_value(&user)?));
        let docs = self.store.query_documents(SAVED_POSTS, &query).await?;
        Ok(docs.len() as u64)
    }

    async fn load_saved_states(
        &self,
        user: UserId,
        posts: &[PostId],
    ) -> Result<(), ServiceError> {
        for post in posts {
            self.is_post_saved(user, post).await?;
        }
        Ok(())
    }

    fn clear_cache(&self) {
        self.liked.clear();
        self.saved.clear();
    }
}
