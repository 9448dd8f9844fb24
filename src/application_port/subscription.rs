use crate::domain_port::collections::from_document;
use crate::domain_port::{Document, LiveQuery};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Typed view over a [`LiveQuery`]. Each delivery is the full current set;
/// consumers re-derive any per-record state on every delivery.
#[derive(Debug)]
pub struct Subscription<T> {
    live: LiveQuery,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Subscription<T> {
    pub fn new(live: LiveQuery) -> Self {
        Self {
            live,
            _record: PhantomData,
        }
    }

    pub async fn next(&mut self) -> Option<Vec<T>> {
        self.live.next().await.map(decode_all)
    }

    pub fn try_next(&mut self) -> Option<Vec<T>> {
        self.live.try_next().map(decode_all)
    }

    pub fn cancel(&mut self) {
        self.live.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.live.is_cancelled()
    }
}

fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match from_document(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping undecodable document in live query: {e}");
                None
            }
        })
        .collect()
}
