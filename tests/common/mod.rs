#![allow(dead_code)]

use socialgraph::application_impl::*;
use socialgraph::application_port::*;
use socialgraph::domain_model::*;
use socialgraph::domain_port::DocumentStore;
use socialgraph::domain_port::collections::{USERS, to_document};
use socialgraph::infra_memory::MemoryDocumentStore;
use std::sync::Arc;

/// Services over one shared in-memory store, without an identity layer.
pub struct Fixture {
    pub store: Arc<MemoryDocumentStore>,
    pub graph: Arc<dyn SocialGraphService>,
    pub feed: Arc<dyn FeedService>,
    pub engagement: Arc<dyn EngagementService>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let dyn_store: Arc<dyn DocumentStore> = store.clone();
        let feed: Arc<dyn FeedService> = Arc::new(RealFeedService::new(dyn_store.clone()));
        let engagement: Arc<dyn EngagementService> =
            Arc::new(RealEngagementService::new(dyn_store.clone(), feed.clone()));
        let graph: Arc<dyn SocialGraphService> =
            Arc::new(RealSocialGraphService::new(dyn_store));
        Self {
            store,
            graph,
            feed,
            engagement,
        }
    }

    /// A second engagement client with its own caches over the same store.
    pub fn other_client(&self) -> Arc<dyn EngagementService> {
        let dyn_store: Arc<dyn DocumentStore> = self.store.clone();
        Arc::new(RealEngagementService::new(dyn_store, self.feed.clone()))
    }

    pub async fn seed_user(&self, name: &str) -> UserId {
        let uid = UserId::generate();
        let user = User::new(
            uid,
            name,
            &format!("{}@example.com", name.to_lowercase()),
            self.store.server_timestamp(),
        );
        self.store
            .set_document(USERS, &uid.to_string(), to_document(&user).unwrap())
            .await
            .unwrap();
        uid
    }

    pub async fn user(&self, uid: UserId) -> User {
        let doc = self.store.get_document(USERS, &uid.to_string()).await.unwrap();
        socialgraph::domain_port::collections::from_document(doc).unwrap()
    }
}
