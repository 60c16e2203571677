//! Replay-latest subscriptions to a store's snapshots.

use crate::metrics::StoreMetrics;
use async_stream::stream;
use futures::stream::Stream;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Observer of a [`ModelStore`](crate::ModelStore)'s states
///
/// Yields the latest snapshot known at subscription time first, then every
/// snapshot published afterwards, in publication order. Snapshots are buffered
/// per subscriber; a subscriber that falls more than the configured capacity
/// behind skips the oldest ones and resumes from the oldest still buffered.
#[derive(Debug)]
pub struct StateSubscription<S> {
    replay: Option<Arc<S>>,
    receiver: broadcast::Receiver<Arc<S>>,
}

impl<S> StateSubscription<S>
where
    S: Send + Sync + 'static,
{
    pub(crate) const fn new(latest: Arc<S>, receiver: broadcast::Receiver<Arc<S>>) -> Self {
        Self {
            replay: Some(latest),
            receiver,
        }
    }

    /// Wait for the next snapshot
    ///
    /// Returns `None` once the store is gone and every buffered snapshot has
    /// been delivered.
    pub async fn next(&mut self) -> Option<Arc<S>> {
        if let Some(latest) = self.replay.take() {
            return Some(latest);
        }

        loop {
            match self.receiver.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => Self::lagged(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next snapshot if one is already buffered
    pub fn try_next(&mut self) -> Option<Arc<S>> {
        if let Some(latest) = self.replay.take() {
            return Some(latest);
        }

        loop {
            match self.receiver.try_recv() {
                Ok(state) => return Some(state),
                Err(TryRecvError::Lagged(skipped)) => Self::lagged(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Adapt the subscription into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Arc<S>> + Send {
        let mut subscription = self;
        stream! {
            while let Some(state) = subscription.next().await {
                yield state;
            }
        }
    }

    fn lagged(skipped: u64) {
        tracing::warn!(skipped, "State observer lagged, skipping oldest snapshots");
        StoreMetrics::record_lag(skipped);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn replays_latest_then_follows() {
        let (tx, rx) = broadcast::channel(4);
        let mut sub = StateSubscription::new(Arc::new(1), rx);

        tx.send(Arc::new(2)).unwrap();
        assert_eq!(sub.next().await.as_deref(), Some(&1));
        assert_eq!(sub.next().await.as_deref(), Some(&2));

        drop(tx);
        assert!(sub.next().await.is_none());
    }

    #[test]
    fn lagging_subscriber_skips_oldest() {
        let (tx, rx) = broadcast::channel(2);
        let mut sub = StateSubscription::new(Arc::new(0), rx);

        for n in 1..=4 {
            tx.send(Arc::new(n)).unwrap();
        }

        assert_eq!(sub.try_next().as_deref(), Some(&0));
        assert_eq!(sub.try_next().as_deref(), Some(&3));
        assert_eq!(sub.try_next().as_deref(), Some(&4));
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn stream_adapter_ends_with_store() {
        let (tx, rx) = broadcast::channel(4);
        let sub = StateSubscription::new(Arc::new("a"), rx);
        tx.send(Arc::new("b")).unwrap();
        drop(tx);

        let seen: Vec<_> = sub.into_stream().map(|s| *s).collect().await;
        assert_eq!(seen, vec!["a", "b"]);
    }
}
