//! Ergonomic testing utilities for intents
//!
//! This module provides a fluent API for testing intents with readable Given-When-Then syntax,
//! without standing up a store.

#![allow(clippy::module_name_repetitions)] // IntentTest is the natural name

use futures::StreamExt;
use mvi_core::{Intent, ReducerError};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for history assertion functions
type HistoryAssertion<S> = Box<dyn FnOnce(&[S])>;

/// Type alias for error assertion functions
type ErrorAssertion = Box<dyn FnOnce(&ReducerError)>;

/// Fluent API for testing intents with Given-When-Then syntax
///
/// Reducers are applied in order, exactly as a store would apply them.
/// Timed intents are awaited, so pause tokio time in tests that use them.
///
/// # Example
///
/// ```ignore
/// use mvi_testing::IntentTest;
///
/// IntentTest::new()
///     .given_state(TasksModelState::default())
///     .when_intent(build_add_task_intent(task))
///     .then_state(|state| {
///         assert_eq!(state.tasks.len(), 1);
///     })
///     .run()
///     .await;
/// ```
pub struct IntentTest<S> {
    initial_state: Option<S>,
    intents: Vec<Intent<S>>,
    state_assertions: Vec<StateAssertion<S>>,
    history_assertions: Vec<HistoryAssertion<S>>,
    error_assertions: Vec<ErrorAssertion>,
}

impl<S> Default for IntentTest<S> {
    fn default() -> Self {
        Self {
            initial_state: None,
            intents: Vec::new(),
            state_assertions: Vec::new(),
            history_assertions: Vec::new(),
            error_assertions: Vec::new(),
        }
    }
}

impl<S> IntentTest<S>
where
    S: Clone + 'static,
{
    /// Create a new intent test
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an intent to apply (When); intents run in the order added
    #[must_use]
    pub fn when_intent(mut self, intent: Intent<S>) -> Self {
        self.intents.push(intent);
        self
    }

    /// Add an assertion about the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about every state produced, in order (Then)
    ///
    /// The initial state is not part of the history.
    #[must_use]
    pub fn then_history<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[S]) + 'static,
    {
        self.history_assertions.push(Box::new(assertion));
        self
    }

    /// Expect a reducer to fail, and assert about the failure (Then)
    ///
    /// State and history assertions then run against the state reached
    /// before the failure.
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&ReducerError) + 'static,
    {
        self.error_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state is not set, if a reducer fails without a
    /// `then_error` expectation (or succeeds despite one), or if any assertion
    /// fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub async fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let mut history = Vec::new();
        let mut failure = None;

        'intents: for intent in self.intents {
            let mut reducers = intent.reducers();
            while let Some(reducer) = reducers.next().await {
                match reducer(&state) {
                    Ok(next) => {
                        history.push(next.clone());
                        state = next;
                    }
                    Err(error) => {
                        failure = Some(error);
                        break 'intents;
                    }
                }
            }
        }

        match (&failure, self.error_assertions.is_empty()) {
            (Some(error), true) => panic!("Unexpected reducer failure: {error}"),
            (None, false) => panic!("Expected a reducer failure, but every reducer succeeded"),
            (Some(error), false) => {
                for assertion in self.error_assertions {
                    assertion(error);
                }
            }
            (None, true) => {}
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.history_assertions {
            assertion(&history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvi_core::{Block, block_intent, interval_blocks_intent, reducer_intent};
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    struct TestState {
        count: i32,
    }

    fn increment() -> Intent<TestState> {
        block_intent(|s: TestState| Some(TestState { count: s.count + 1 }))
    }

    #[tokio::test]
    async fn test_intent_test_increment() {
        IntentTest::new()
            .given_state(TestState { count: 0 })
            .when_intent(increment())
            .when_intent(increment())
            .then_state(|state| {
                assert_eq!(state.count, 2);
            })
            .then_history(|history| {
                assert_eq!(history.len(), 2);
            })
            .run()
            .await;
    }

    #[tokio::test]
    async fn test_intent_test_expected_failure() {
        IntentTest::new()
            .given_state(TestState { count: 3 })
            .when_intent(increment())
            .when_intent(reducer_intent(|_: &TestState| None))
            .when_intent(increment())
            .then_error(|error| {
                assert_eq!(*error, ReducerError::InconsistentState);
            })
            .then_state(|state| {
                assert_eq!(state.count, 4);
            })
            .run()
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_intent_test_timed_intent() {
        let blocks: Vec<Block<TestState>> = vec![
            Box::new(|s| TestState { count: s.count * 10 }),
            Box::new(|s| TestState { count: s.count + 5 }),
        ];

        IntentTest::new()
            .given_state(TestState { count: 1 })
            .when_intent(interval_blocks_intent(Duration::from_millis(100), blocks))
            .then_history(|history| {
                assert_eq!(
                    history,
                    [TestState { count: 10 }, TestState { count: 15 }]
                );
            })
            .run()
            .await;
    }
}
