//! # MVI Core
//!
//! Core traits and types for the Model-View-Intent architecture.
//!
//! This crate provides the fundamental abstractions for building unidirectional,
//! reactive state containers: intents that expand into reducers, and reducers
//! that turn one immutable state value into the next.
//!
//! ## Core Concepts
//!
//! - **State**: An immutable value describing one slice of the application model
//! - **Reducer**: One-shot pure function `&State → State` that may fail loudly
//! - **Intent**: A user or system action, expressed as a lazy stream of reducers
//! - **Narrow**: Explicit predicate used to guard intents to a state variant
//!
//! ## Architecture Principles
//!
//! - Unidirectional Data Flow: `ViewEvent → Intent → Reducer → State`
//! - Immutable snapshots (a produced state is never mutated in place)
//! - Fail fast on inconsistent reducers
//! - Time-gated intents are explicit schedules, not operator chains
//!
//! ## Example
//!
//! ```
//! use mvi_core::intent::{block_intent, reducer_intent};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! let increment = block_intent(|state: Counter| {
//!     Some(Counter { count: state.count + 1 })
//! });
//! let reset = reducer_intent(|_: &Counter| Some(Counter { count: 0 }));
//!
//! assert_eq!(increment.name(), "block_intent");
//! assert_eq!(reset.name(), "reducer_intent");
//! ```

/// Reducer type and reducer failure
pub mod reducer;

/// Intent type, intent constructors and state narrowing
pub mod intent;

/// Explicit queue + clock used by interval-sequenced intents
pub mod schedule;

// Re-export commonly used types
pub use intent::{
    Block, Intent, Narrow, ReducerStream, block_intent, checked_intent, interval_blocks_intent,
    reducer_intent,
};
pub use reducer::{Reducer, ReducerError};
pub use schedule::IntervalSchedule;
