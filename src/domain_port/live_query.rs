use crate::domain_port::Document;
use std::fmt;
use tokio::sync::mpsc::UnboundedReceiver;

type Canceller = Box<dyn FnOnce() + Send>;

/// A standing query. Each delivery is the full ordered result set.
///
/// Cancelling unregisters the query from its store and discards anything not
/// yet read. Cancelling twice is a no-op, and dropping the handle cancels it.
pub struct LiveQuery {
    receiver: UnboundedReceiver<Vec<Document>>,
    canceller: Option<Canceller>,
}

impl LiveQuery {
    pub fn new(receiver: UnboundedReceiver<Vec<Document>>, canceller: Canceller) -> Self {
        Self {
            receiver,
            canceller: Some(canceller),
        }
    }

    /// Waits for the next result set. `None` once cancelled or the store is gone.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        if self.is_cancelled() {
            return None;
        }
        self.receiver.recv().await
    }

    /// Next already-delivered result set, without waiting.
    pub fn try_next(&mut self) -> Option<Vec<Document>> {
        if self.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    pub fn cancel(&mut self) {
        if let Some(canceller) = self.canceller.take() {
            canceller();
            self.receiver.close();
            while self.receiver.try_recv().is_ok() {}
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.canceller.is_none()
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for LiveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn cancel_runs_canceller_once_and_drops_pending_sets() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = unbounded_channel();
        let counter = calls.clone();
        let mut live = LiveQuery::new(
            rx,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tx.send(vec![Document::new()]).unwrap();
        live.cancel();
        live.cancel();
        drop(live);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(tx.send(Vec::new()).is_err());
    }

    #[tokio::test]
    async fn next_returns_none_after_cancel() {
        let (tx, rx) = unbounded_channel();
        let mut live = LiveQuery::new(rx, Box::new(|| {}));
        tx.send(Vec::new()).unwrap();
        assert_eq!(live.next().await, Some(Vec::new()));

        live.cancel();
        assert!(live.next().await.is_none());
        assert!(live.try_next().is_none());
    }
}
