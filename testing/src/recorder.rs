//! Snapshot recording for store tests
//!
//! [`StateRecorder`] subscribes to a store and keeps every snapshot it
//! publishes, so tests can assert on the full sequence or wait for a state
//! produced by work the test does not drive directly (e.g. a coordinator).

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Test utilities document panics where critical

use mvi_runtime::ModelStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Records every snapshot published by a [`ModelStore`]
///
/// The first recorded snapshot is the store's latest state at attach time.
///
/// # Example
///
/// ```
/// use mvi_core::reducer_intent;
/// use mvi_runtime::ModelStore;
/// use mvi_testing::StateRecorder;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = ModelStore::new(0_i32);
/// let recorder = StateRecorder::attach(&store);
///
/// store.process(reducer_intent(|n: &i32| Some(n + 1))).unwrap();
///
/// let reached = recorder.wait_until(|n| *n == 1, Duration::from_secs(1)).await;
/// assert!(reached.is_some());
/// assert_eq!(recorder.values(), vec![0, 1]);
/// # }
/// ```
#[derive(Debug)]
pub struct StateRecorder<S> {
    snapshots: Arc<Mutex<Vec<Arc<S>>>>,
    notify: Arc<Notify>,
}

// Recorders share one log, so cloning never requires `S: Clone`
impl<S> Clone for StateRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            snapshots: Arc::clone(&self.snapshots),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<S> StateRecorder<S>
where
    S: Send + Sync + 'static,
{
    /// Subscribe to `store` and start recording in a background task
    #[must_use]
    pub fn attach(store: &ModelStore<S>) -> Self {
        let recorder = Self {
            snapshots: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
        };

        let mut subscription = store.model_state();
        // Replay the latest snapshot synchronously so it is never missed
        if let Some(latest) = subscription.try_next() {
            recorder.push(latest);
        }

        let background = recorder.clone();
        tokio::spawn(async move {
            while let Some(state) = subscription.next().await {
                background.push(state);
            }
        });

        recorder
    }

    fn push(&self, state: Arc<S>) {
        self.snapshots.lock().unwrap().push(state);
        self.notify.notify_waiters();
    }

    /// Every snapshot recorded so far, in publication order
    #[must_use]
    pub fn snapshots(&self) -> Vec<Arc<S>> {
        self.snapshots.lock().unwrap().clone()
    }

    /// Number of snapshots recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent snapshot
    #[must_use]
    pub fn last(&self) -> Option<Arc<S>> {
        self.snapshots.lock().unwrap().last().cloned()
    }

    /// Wait for a recorded snapshot matching `predicate`
    ///
    /// Returns the first match, or `None` if none shows up within `timeout`.
    pub async fn wait_until<F>(&self, predicate: F, timeout: Duration) -> Option<Arc<S>>
    where
        F: Fn(&S) -> bool,
    {
        let search = async {
            loop {
                let notified = self.notify.notified();
                let found = self
                    .snapshots
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|s| predicate(s))
                    .cloned();
                if found.is_some() {
                    return found;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, search).await.ok().flatten()
    }

    /// Wait until at least `count` snapshots were recorded
    pub async fn wait_for_len(&self, count: usize, timeout: Duration) -> bool {
        let search = async {
            loop {
                let notified = self.notify.notified();
                if self.len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, search).await.is_ok()
    }
}

impl<S> StateRecorder<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Owned copies of every recorded snapshot
    #[must_use]
    pub fn values(&self) -> Vec<S> {
        self.snapshots
            .lock()
            .unwrap()
            .iter()
            .map(|s| S::clone(s))
            .collect()
    }
}
