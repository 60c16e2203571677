//! Handles returned by [`ModelStore::process`](crate::ModelStore::process).

use crate::error::StoreError;
use futures::stream::AbortHandle;
use std::time::Duration;
use tokio::sync::oneshot;

/// How an intent ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// Every reducer the intent produced was applied
    Completed {
        /// Number of reducers applied
        applied: usize,
    },

    /// The intent was cancelled before its reducer stream ended
    Cancelled {
        /// Number of reducers applied before cancellation
        applied: usize,
    },
}

impl IntentOutcome {
    /// Number of reducers that were applied
    #[must_use]
    pub const fn applied(&self) -> usize {
        match self {
            Self::Completed { applied } | Self::Cancelled { applied } => *applied,
        }
    }
}

/// Handle for tracking one queued intent
///
/// Dropping the handle does not cancel the intent.
///
/// # Example
///
/// ```ignore
/// let handle = store.process(intervals)?;
/// handle.cancel(); // reducers not yet released are never applied
/// let outcome = handle.wait().await?;
/// ```
#[derive(Debug)]
pub struct IntentHandle {
    id: u64,
    name: String,
    abort: AbortHandle,
    done: oneshot::Receiver<Result<IntentOutcome, StoreError>>,
}

impl IntentHandle {
    pub(crate) const fn new(
        id: u64,
        name: String,
        abort: AbortHandle,
        done: oneshot::Receiver<Result<IntentOutcome, StoreError>>,
    ) -> Self {
        Self {
            id,
            name,
            abort,
            done,
        }
    }

    /// Store-local sequence number of the intent
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Label of the intent
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the intent from releasing further reducers
    ///
    /// A reducer that is already being applied finishes; nothing is ever
    /// applied halfway.
    pub fn cancel(&self) {
        tracing::debug!(intent_id = self.id, intent = %self.name, "Cancelling intent");
        self.abort.abort();
    }

    /// Whether [`cancel`](Self::cancel) was called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Wait for the intent to finish
    ///
    /// # Errors
    ///
    /// - [`StoreError::Reducer`] if one of its reducers was inconsistent
    /// - [`StoreError::Halted`] if the store halted before the intent finished
    /// - [`StoreError::ChannelClosed`] if the apply loop went away
    pub async fn wait(self) -> Result<IntentOutcome, StoreError> {
        self.done.await.map_err(|_| StoreError::ChannelClosed)?
    }

    /// Wait for the intent to finish, giving up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the intent has not finished in time,
    /// otherwise the same errors as [`wait`](Self::wait).
    pub async fn wait_with_timeout(self, timeout: Duration) -> Result<IntentOutcome, StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}
