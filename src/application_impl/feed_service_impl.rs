use crate::application_port::{FeedService, ServiceError, Subscription, require_text};
use crate::domain_model::*;
use crate::domain_port::collections::{POSTS, USERS, from_document, to_document, to_value};
use crate::domain_port::{DocumentStore, FieldChange, Filter, OrderBy, Query};
use std::sync::Arc;

pub struct RealFeedService {
    store: Arc<dyn DocumentStore>,
}

impl RealFeedService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn newest_first() -> Query {
        Query::new().order_by(OrderBy::desc("createdAt"))
    }

    async fn query_posts(&self, query: &Query) -> Result<Vec<Post>, ServiceError> {
        let docs = self.store.query_documents(POSTS, query).await?;
        let mut posts = Vec::with_capacity(docs.len());
        for doc in docs {
            posts.push(from_document(doc)?);
        }
        Ok(posts)
    }
}

#[async_trait::async_trait]
impl FeedService for RealFeedService {
    async fn create_post(&self, author: UserId, text: &str) -> Result<Post, ServiceError> {
        require_text("post text", text)?;
        let author_doc = self.store.get_document(USERS, &author.to_string()).await?;
        let author_record: User = from_document(author_doc)?;

        let post = Post {
            id: PostId::generate(),
            author_id: author,
            author_name: author_record.display_name,
            author_email: author_record.email,
            text: text.to_owned(),
            created_at: self.store.server_timestamp(),
            likes_count: 0,
            comments_count: 0,
        };
        self.store
            .set_document(POSTS, post.id.as_str(), to_document(&post)?)
            .await?;

        tracing::info!(post = %post.id, %author, "post created");
        Ok(post)
    }

    async fn delete_post(&self, user: UserId, post: &PostId) -> Result<(), ServiceError> {
        let existing = self.get_post(post).await?;
        if existing.author_id != user {
            return Err(ServiceError::Unauthorized(
                "only the author can delete this post".to_owned(),
            ));
        }

        self.store.delete_document(POSTS, post.as_str()).await?;
        tracing::info!(%post, %user, "post deleted");
        Ok(())
    }

    async fn get_post(&self, post: &PostId) -> Result<Post, ServiceError> {
        let doc = self.store.get_document(POSTS, post.as_str()).await?;
        Ok(from_document(doc)?)
    }

    async fn get_all_posts(&self) -> Result<Vec<Post>, ServiceError> {
        self.query_posts(&Self::newest_first()).await
    }

    async fn get_user_posts(&self, author: UserId) -> Result<Vec<Post>, ServiceError> {
        let query = Self::newest_first().filter(Filter::eq("authorId", to_value(&author)?));
        self.query_posts(&query).await
    }

    async fn subscribe_feed(&self) -> Result<Subscription<Post>, ServiceError> {
        let live = self.store.subscribe(POSTS, Self::newest_first()).await?;
        Ok(Subscription::new(live))
    }

    async fn update_post_counts(
        &self,
        post: &PostId,
        counts: PostCounts,
    ) -> Result<(), ServiceError> {
        if counts.is_empty() {
            return Ok(());
        }

        let mut changes = Vec::new();
        if let Some(likes) = counts.likes_count {
            changes.push(("likesCount".to_owned(), FieldChange::Set(likes.into())));
        }
        if let Some(comments) = counts.comments_count {
            changes.push(("commentsCount".to_owned(), FieldChange::Set(comments.into())));
        }
        self.store
            .update_document(POSTS, post.as_str(), changes)
            .await?;
        Ok(())
    }
}
