use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{DocumentStore, IdentityProvider, Principal};
use std::sync::Arc;
use tokio::sync::watch;

/// Services bound to one client session.
///
/// Each public operation resolves the signed-in principal and reports through
/// [`Outcome`], so callers never see raw store or identity errors.
pub struct Session {
    id: String,
    identity: Arc<dyn IdentityProvider>,
    accounts: Arc<dyn AccountService>,
    graph: Arc<dyn SocialGraphService>,
    engagement: Arc<dyn EngagementService>,
    feed: Arc<dyn FeedService>,
    suggestion_limit: usize,
}

impl Session {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        suggestion_limit: usize,
    ) -> Self {
        let feed: Arc<dyn FeedService> = Arc::new(RealFeedService::new(store.clone()));
        let engagement: Arc<dyn EngagementService> =
            Arc::new(RealEngagementService::new(store.clone(), feed.clone()));
        let graph: Arc<dyn SocialGraphService> =
            Arc::new(RealSocialGraphService::new(store.clone()));
        let accounts: Arc<dyn AccountService> =
            Arc::new(RealAccountService::new(identity.clone(), store));

        Self {
            id: nanoid::nanoid!(10),
            identity,
            accounts,
            graph,
            engagement,
            feed,
            suggestion_limit,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph(&self) -> &Arc<dyn SocialGraphService> {
        &self.graph
    }

    pub fn engagement(&self) -> &Arc<dyn EngagementService> {
        &self.engagement
    }

    pub fn feed(&self) -> &Arc<dyn FeedService> {
        &self.feed
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.identity.current_principal()
    }

    pub fn auth_changes(&self) -> watch::Receiver<Option<Principal>> {
        self.identity.on_auth_change()
    }

    fn me(&self) -> Result<UserId, ServiceError> {
        self.identity
            .current_principal()
            .map(|p| p.user_id)
            .ok_or(ServiceError::Unauthenticated)
    }

    fn settle<T>(&self, op: &str, result: Result<T, ServiceError>) -> Outcome<T> {
        if let Err(e) = &result {
            tracing::warn!(session = %self.id, op, "{e}");
        }
        Outcome::from(result)
    }

    /// Drops per-session state.
    pub fn end(&self) {
        self.engagement.clear_cache();
        tracing::debug!(session = %self.id, "session ended");
    }

    // region account

    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Outcome<User> {
        let result = self.accounts.sign_up(email, password, display_name).await;
        self.settle("sign_up", result)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Outcome<User> {
        let result = self.accounts.sign_in(email, password).await;
        self.settle("sign_in", result)
    }

    pub async fn sign_out(&self) -> Outcome<()> {
        let result = self.accounts.sign_out().await;
        if result.is_ok() {
            self.engagement.clear_cache();
        }
        self.settle("sign_out", result)
    }

    pub async fn current_user_data(&self) -> Outcome<User> {
        let result = self.accounts.current_user_data().await;
        self.settle("current_user_data", result)
    }

    // endregion

    // region social graph

    pub async fn send_friend_request(&self, to: UserId) -> Outcome<()> {
        let result = match self.me() {
            Ok(me) => self.graph.send_friend_request(me, to).await,
            Err(e) => Err(e),
        };
        self.settle("send_friend_request", result)
    }

    pub async fn accept_friend_request(&self, from: UserId) -> Outcome<()> {
        let result = match self.me() {
            Ok(me) => self.graph.accept_friend_request(me, from).await,
            Err(e) => Err(e),
        };
        self.settle("accept_friend_request", result)
    }

    pub async fn reject_friend_request(&self, from: UserId) -> Outcome<()> {
        let result = match self.me() {
            Ok(me) => self.graph.reject_friend_request(me, from).await,
            Err(e) => Err(e),
        };
        self.settle("reject_friend_request", result)
    }

    pub async fn remove_friend(&self, friend: UserId) -> Outcome<()> {
        let result = match self.me() {
            Ok(me) => self.graph.remove_friend(me, friend).await,
            Err(e) => Err(e),
        };
        self.settle("remove_friend", result)
    }

    pub async fn friends_list(&self) -> Outcome<Vec<User>> {
        let result = match self.me() {
            Ok(me) => self.graph.get_friends_list(me).await,
            Err(e) => Err(e),
        };
        self.settle("friends_list", result)
    }

    pub async fn pending_requests(&self) -> Outcome<Vec<PendingRequest>> {
        let result = match self.me() {
            Ok(me) => self.graph.get_pending_requests(me).await,
            Err(e) => Err(e),
        };
        self.settle("pending_requests", result)
    }

    pub async fn friend_suggestions(&self, limit: Option<usize>) -> Outcome<Vec<User>> {
        let limit = limit.unwrap_or(self.suggestion_limit);
        let result = match self.me() {
            Ok(me) => self.graph.get_friend_suggestions(me, limit).await,
            Err(e) => Err(e),
        };
        self.settle("friend_suggestions", result)
    }

    pub async fn friendship_status(&self, other: UserId) -> Outcome<FriendshipStatus> {
        let result = match self.me() {
            Ok(me) => self.graph.get_friendship_status(me, other).await,
            Err(e) => Err(e),
        };
        self.settle("friendship_status", result)
    }

    // endregion

    // region feed

    pub async fn create_post(&self, text: &str) -> Outcome<Post> {
        let result = match self.me() {
            Ok(me) => self.feed.create_post(me, text).await,
            Err(e) => Err(e),
        };
        self.settle("create_post", result)
    }

    pub async fn delete_post(&self, post: &PostId) -> Outcome<()> {
        let result = match self.me() {
            Ok(me) => self.feed.delete_post(me, post).await,
            Err(e) => Err(e),
        };
        self.settle("delete_post", result)
    }

    pub async fn subscribe_feed(&self) -> Outcome<Subscription<Post>> {
        let result = self.feed.subscribe_feed().await;
        self.settle("subscribe_feed", result)
    }

    // endregion

    // region engagement

    pub async fn toggle_like(&self, post: &PostId) -> Outcome<LikeState> {
        let result = match self.me() {
            Ok(me) => self.engagement.toggle_like(me, post).await,
            Err(e) => Err(e),
        };
        self.settle("toggle_like", result)
    }

    pub async fn add_comment(&self, post: &PostId, text: &str) -> Outcome<Comment> {
        let result = match self.me() {
            Ok(me) => self.engagement.add_comment(me, post, text).await,
            Err(e) => Err(e),
        };
        self.settle("add_comment", result)
    }

    pub async fn delete_comment(&self, comment: &CommentId) -> Outcome<u64> {
        let result = match self.me() {
            Ok(me) => self.engagement.delete_comment(me, comment).await,
            Err(e) => Err(e),
        };
        self.settle("delete_comment", result)
    }

    pub async fn toggle_save(&self, post: &PostId) -> Outcome<bool> {
        let result = match self.me() {
            Ok(me) => self.engagement.toggle_save(me, post).await,
            Err(e) => Err(e),
        };
        self.settle("toggle_save", result)
    }

    pub async fn saved_posts(&self) -> Outcome<Vec<Post>> {
        let result = match self.me() {
            Ok(me) => self.engagement.get_saved_posts(me).await,
            Err(e) => Err(e),
        };
        self.settle("saved_posts", result)
    }

    // endregion
}
