//! # MVI Testing
//!
//! Testing utilities and helpers for the MVI architecture.
//!
//! This crate provides:
//! - [`IntentTest`]: Given-When-Then harness that applies intents without a store
//! - [`StateRecorder`]: Captures every snapshot a store publishes
//! - [`helpers`]: Store settling and test tracing setup
//!
//! ## Example
//!
//! ```ignore
//! use mvi_testing::{helpers, StateRecorder};
//!
//! #[tokio::test]
//! async fn test_add_then_clear() {
//!     let store = ModelStore::new(TasksModelState::default());
//!     let recorder = StateRecorder::attach(&store);
//!
//!     store.process(build_add_task_intent(task))?;
//!     helpers::settle(&store).await?;
//!
//!     assert_eq!(recorder.len(), 2);
//! }
//! ```

mod intent_test;
mod recorder;

/// Test helpers and utilities
pub mod helpers {
    use mvi_core::Intent;
    use mvi_runtime::{ModelStore, StoreError};

    /// Wait until every intent queued so far has released its ready reducers
    ///
    /// Queues an empty intent and waits for it. Stores apply ready reducers in
    /// arrival order, so once it finishes everything queued before it (apart
    /// from reducers still waiting on a clock) has been applied.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it rejects the probe intent.
    pub async fn settle<S>(store: &ModelStore<S>) -> Result<(), StoreError>
    where
        S: Send + Sync + 'static,
    {
        store.process(Intent::empty().named("settle"))?.wait().await?;
        Ok(())
    }

    /// Install a test-friendly tracing subscriber
    ///
    /// Honors `RUST_LOG`. Safe to call from every test: only the first call
    /// installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use intent_test::IntentTest;
pub use recorder::StateRecorder;
