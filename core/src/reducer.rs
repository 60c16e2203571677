//! The reducer: a one-shot transformation from a prior state to the next one.
//!
//! Reducers never receive mutable access to the state they transform. The
//! store hands them a shared reference to the current snapshot and publishes
//! whatever they return, so a snapshot observers already hold can never change
//! underneath them.

use thiserror::Error;

/// Errors a reducer can signal instead of producing a next state
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerError {
    /// The reducer could not produce a coherent next state.
    ///
    /// This is a logic bug in whatever built the intent, not a runtime
    /// condition. Stores never skip over it silently.
    #[error("Reducer encountered an inconsistent state")]
    InconsistentState,
}

/// A pure, one-shot `&S → S` transformation
///
/// Returning [`ReducerError::InconsistentState`] aborts the owning intent.
pub type Reducer<S> = Box<dyn FnOnce(&S) -> Result<S, ReducerError> + Send>;

/// Box a closure into a [`Reducer`]
///
/// # Example
///
/// ```
/// use mvi_core::reducer::{reducer, ReducerError};
///
/// let double = reducer(|n: &i32| Ok(n * 2));
/// assert_eq!(double(&21), Ok(42));
///
/// let broken = reducer(|_: &i32| Err(ReducerError::InconsistentState));
/// assert_eq!(broken(&1), Err(ReducerError::InconsistentState));
/// ```
pub fn reducer<S, F>(f: F) -> Reducer<S>
where
    F: FnOnce(&S) -> Result<S, ReducerError> + Send + 'static,
{
    Box::new(f)
}

/// Box an `Option`-returning closure, mapping `None` to
/// [`ReducerError::InconsistentState`]
pub fn checked<S, F>(f: F) -> Reducer<S>
where
    F: FnOnce(&S) -> Option<S> + Send + 'static,
{
    Box::new(move |old: &S| f(old).ok_or(ReducerError::InconsistentState))
}
