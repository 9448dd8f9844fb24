use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

const NO_WRITE_LIMIT: usize = usize::MAX;

struct Subscriber {
    collection: String,
    query: Query,
    sender: UnboundedSender<Vec<Document>>,
}

/// In-process document store with live queries and fault injection.
pub struct MemoryDocumentStore {
    collections: DashMap<String, BTreeMap<String, Document>>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_subscriber: AtomicU64,
    last_timestamp: AtomicI64,
    unavailable: AtomicBool,
    writes_left: AtomicUsize,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            subscribers: Arc::new(DashMap::new()),
            next_subscriber: AtomicU64::new(0),
            last_timestamp: AtomicI64::new(0),
            unavailable: AtomicBool::new(false),
            writes_left: AtomicUsize::new(NO_WRITE_LIMIT),
        }
    }

    /// Every call fails with `Unavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The next `n` writes succeed, every write after that fails.
    pub fn fail_after_writes(&self, n: usize) {
        self.writes_left.store(n, Ordering::SeqCst);
    }

    pub fn clear_faults(&self) {
        self.set_unavailable(false);
        self.writes_left.store(NO_WRITE_LIMIT, Ordering::SeqCst);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is unavailable".to_owned()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let claimed = self
            .writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                NO_WRITE_LIMIT => Some(NO_WRITE_LIMIT),
                0 => None,
                n => Some(n - 1),
            });
        if claimed.is_err() {
            return Err(StoreError::Unavailable("write rejected".to_owned()));
        }
        Ok(())
    }

    fn run_query(&self, collection: &str, query: &Query) -> Vec<Document> {
        let Some(docs) = self.collections.get(collection) else {
            return Vec::new();
        };
        // BTreeMap order gives ties a stable id order
        let mut result: Vec<Document> = docs
            .values()
            .filter(|doc| query.matches(doc))
            .cloned()
            .collect();
        drop(docs);

        if let Some(order_by) = &query.order_by {
            result.sort_by(|a, b| order_by.compare(a, b));
        }
        if let Some(limit) = query.limit {
            result.truncate(limit);
        }
        result
    }

    fn notify(&self, collection: &str) {
        let targets: Vec<(u64, Query, UnboundedSender<Vec<Document>>)> = self
            .subscribers
            .iter()
            .filter(|entry| entry.collection == collection)
            .map(|entry| (*entry.key(), entry.query.clone(), entry.sender.clone()))
            .collect();

        let mut gone = Vec::new();
        for (id, query, sender) in targets {
            let snapshot = self.run_query(collection, &query);
            if sender.send(snapshot).is_err() {
                gone.push(id);
            }
        }
        for id in gone {
            self.subscribers.remove(&id);
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn server_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let previous = self
            .last_timestamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let issued = now.max(previous + 1);
        DateTime::<Utc>::from_timestamp_micros(issued).unwrap_or_else(Utc::now)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.check_available()?;
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        self.collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
        self.notify(collection);
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        changes: FieldChanges,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        {
            let not_found = || StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            };
            let mut docs = self.collections.get_mut(collection).ok_or_else(not_found)?;
            let doc = docs.get_mut(id).ok_or_else(not_found)?;
            for (field, change) in changes {
                let updated = change.apply(doc.remove(&field));
                doc.insert(field, updated);
            }
        }
        self.notify(collection);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|mut docs| docs.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        Ok(())
    }

    async fn query_documents(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        Ok(self.run_query(collection, query))
    }

    async fn subscribe(&self, collection: &str, query: Query) -> Result<LiveQuery, StoreError> {
        self.check_available()?;
        let (sender, receiver) = unbounded_channel();
        let initial = self.run_query(collection, &query);
        // receiver is alive, so the first delivery cannot fail
        let _ = sender.send(initial);

        let id = self.next_subscriber.fetch_add(1, Ordering::SeqCst);
        self.subscribers.insert(
            id,
            Subscriber {
                collection: collection.to_owned(),
                query,
                sender,
            },
        );
        tracing::debug!(subscription = id, collection, "live query registered");

        let registry: Weak<DashMap<u64, Subscriber>> = Arc::downgrade(&self.subscribers);
        Ok(LiveQuery::new(
            receiver,
            Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(&id);
                    tracing::debug!(subscription = id, "live query cancelled");
                }
            }),
        ))
    }
}
