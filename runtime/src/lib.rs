//! # MVI Runtime
//!
//! Runtime implementation for the Model-View-Intent architecture.
//!
//! This crate provides the [`ModelStore`]: the single authoritative holder of
//! one state slice. It accepts intents from any number of producers, applies
//! their reducers one at a time in arrival order, and republishes every
//! resulting snapshot to its observers.
//!
//! ## Core Components
//!
//! - **`ModelStore`**: Serialized state container with a dedicated apply loop
//! - **`StateSubscription`**: Replay-latest view of the store's snapshots
//! - **`IntentHandle`**: Completion tracking and cancellation for one intent
//! - **`StoreConfig`**: Observer buffering, fault policy and shutdown timeout
//!
//! ## Example
//!
//! ```
//! use mvi_core::block_intent;
//! use mvi_runtime::ModelStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), mvi_runtime::StoreError> {
//! let store = ModelStore::new(0_i32);
//! let mut states = store.model_state();
//!
//! store.process(block_intent(|n: i32| Some(n + 1)))?.wait().await?;
//!
//! assert_eq!(states.next().await.as_deref(), Some(&0)); // replayed latest
//! assert_eq!(states.next().await.as_deref(), Some(&1));
//! assert_eq!(*store.current(), 1);
//! # Ok(())
//! # }
//! ```

/// Prometheus metrics for observability
pub mod metrics;

/// Store configuration
pub mod config;

/// Per-intent completion tracking
pub mod handle;

/// Replay-latest state subscriptions
pub mod subscription;

/// The serialized model store
pub mod store;

/// Error types for the Store runtime
pub mod error {
    use mvi_core::ReducerError;
    use std::time::Duration;
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// A reducer of the intent reported an inconsistent state
        ///
        /// The remaining reducers of that intent are dropped. States already
        /// published by earlier reducers stay in place.
        #[error("Intent `{intent}` failed: {source}")]
        Reducer {
            /// Label of the failing intent
            intent: String,
            /// The reducer failure
            #[source]
            source: ReducerError,
        },

        /// The store halted after an inconsistent reducer and accepts no intents
        ///
        /// Only returned under [`FaultPolicy::Halt`](crate::config::FaultPolicy::Halt).
        #[error("Store halted after an inconsistent reducer")]
        Halted,

        /// Store is shutting down and not accepting new intents
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for the apply loop to stop
        #[error("Shutdown timed out after {0:?}")]
        ShutdownTimeout(Duration),

        /// Timeout waiting for an intent to finish
        #[error("Timeout waiting for intent")]
        Timeout,

        /// The apply loop is gone
        ///
        /// Returned when the store's apply loop stopped before the intent
        /// could be queued or before it reported back.
        #[error("Store channel closed")]
        ChannelClosed,
    }
}

pub use config::{FaultPolicy, StoreConfig};
pub use error::StoreError;
pub use handle::{IntentHandle, IntentOutcome};
pub use store::ModelStore;
pub use subscription::StateSubscription;
