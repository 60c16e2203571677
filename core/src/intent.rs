//! Intents and the factories that build them.
//!
//! An [`Intent`] is one user or system action. It owns a lazily built stream
//! of [`Reducer`]s which a store subscribes to exactly once. Most intents
//! expand into a single reducer; interval-sequenced intents expand into a
//! series of reducers gated by a clock.
//!
//! # Constructors
//!
//! | Factory                    | Reducers | Failure on `None`         |
//! |----------------------------|----------|---------------------------|
//! | [`reducer_intent`]         | 1        | `InconsistentState`       |
//! | [`block_intent`]           | 1        | `InconsistentState`       |
//! | [`interval_blocks_intent`] | N, timed | never                     |
//! | [`checked_intent`]         | 1        | falls back, never fails   |

use crate::reducer::{self, Reducer};
use crate::schedule::IntervalSchedule;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::borrow::Cow;
use std::time::Duration;

/// Stream of reducers produced by an intent
pub type ReducerStream<S> = BoxStream<'static, Reducer<S>>;

/// Infallible state transformation used by [`interval_blocks_intent`]
pub type Block<S> = Box<dyn FnOnce(S) -> S + Send>;

type StreamFactory<S> = Box<dyn FnOnce() -> ReducerStream<S> + Send>;

/// A named action that expands into a lazy stream of reducers
///
/// Nothing runs until [`Intent::reducers`] is called, and it can only be
/// called once: the intent is consumed by the store that processes it.
pub struct Intent<S> {
    name: Cow<'static, str>,
    source: StreamFactory<S>,
}

impl<S: 'static> Intent<S> {
    /// Build an intent from a factory of reducer streams
    ///
    /// The factory runs when a store subscribes, not when the intent is built.
    pub fn from_stream<F, St>(make: F) -> Self
    where
        F: FnOnce() -> St + Send + 'static,
        St: Stream<Item = Reducer<S>> + Send + 'static,
    {
        Self {
            name: Cow::Borrowed("intent"),
            source: Box::new(move || make().boxed()),
        }
    }

    /// Build an intent that emits exactly one reducer then completes
    pub fn single(reducer: Reducer<S>) -> Self {
        Self::from_stream(move || stream::once(futures::future::ready(reducer)))
    }

    /// An intent that emits no reducers at all
    #[must_use]
    pub fn empty() -> Self {
        Self::from_stream(stream::empty).named("empty_intent")
    }

    /// Chain intents so their reducers are emitted back to back, in order
    #[must_use]
    pub fn concat(intents: Vec<Self>) -> Self {
        Self::from_stream(move || stream::iter(intents).flat_map(Self::reducers))
            .named("concat_intent")
    }

    /// Attach a label used in logs and metrics
    #[must_use]
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// The intent's label
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe to the intent's reducers, consuming it
    #[must_use]
    pub fn reducers(self) -> ReducerStream<S> {
        (self.source)()
    }
}

impl<S> std::fmt::Debug for Intent<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intent").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Narrow a state to one of its sub-shapes
///
/// Implemented by tagged-union states for each variant payload an intent may
/// be guarded on. Returning `None` means the state is not in that shape.
pub trait Narrow<Sub> {
    /// Borrow the `Sub` view of this state, if the state currently has that shape
    fn narrow(&self) -> Option<&Sub>;
}

/// Single-reducer intent from a function of the prior state
///
/// Returning `None` signals an inconsistent state and fails the intent.
pub fn reducer_intent<S, F>(f: F) -> Intent<S>
where
    S: 'static,
    F: FnOnce(&S) -> Option<S> + Send + 'static,
{
    Intent::single(reducer::checked(f)).named("reducer_intent")
}

/// Single-reducer intent whose block owns a copy of the prior state
///
/// Same semantics as [`reducer_intent`]; owning the state lets the block use
/// struct update syntax directly.
///
/// ```
/// use mvi_core::block_intent;
///
/// #[derive(Clone)]
/// struct Form {
///     title: String,
///     dirty: bool,
/// }
///
/// let intent = block_intent(|form: Form| Some(Form { dirty: true, ..form }));
/// assert_eq!(intent.name(), "block_intent");
/// ```
pub fn block_intent<S, F>(block: F) -> Intent<S>
where
    S: Clone + 'static,
    F: FnOnce(S) -> Option<S> + Send + 'static,
{
    Intent::single(reducer::checked(move |old: &S| block(old.clone()))).named("block_intent")
}

/// Intent applying `blocks` one per tick of a `period` clock
///
/// Block `i` is released no earlier than `i * period` after the store starts
/// consuming the intent, the first one immediately. Blocks are paired with
/// ticks index for index, so they are always applied in the order given.
/// Cancelling the intent drops every block that has not fired yet.
pub fn interval_blocks_intent<S>(period: Duration, blocks: Vec<Block<S>>) -> Intent<S>
where
    S: Clone + Send + 'static,
{
    Intent::from_stream(move || IntervalSchedule::new(period, blocks).into_stream())
        .named("interval_blocks_intent")
}

/// Single-reducer intent guarded on the state narrowing to `Sub`
///
/// If the current state narrows to `Sub` the block runs against it. If it does
/// not, or the block returns `None`, `fallback` produces the next state from
/// the current one instead. A guard mismatch is therefore never an error.
///
/// ```
/// use mvi_core::{checked_intent, Narrow};
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Door {
///     Open,
///     Locked(u32),
/// }
///
/// impl Narrow<u32> for Door {
///     fn narrow(&self) -> Option<&u32> {
///         match self {
///             Door::Locked(code) => Some(code),
///             Door::Open => None,
///         }
///     }
/// }
///
/// // Only a locked door can be unlocked; otherwise keep the state
/// let unlock = checked_intent(|_code: &u32| Some(Door::Open), Door::clone);
/// assert_eq!(unlock.name(), "checked_intent");
/// ```
pub fn checked_intent<T, Sub, B, F>(block: B, fallback: F) -> Intent<T>
where
    T: Narrow<Sub> + 'static,
    B: FnOnce(&Sub) -> Option<T> + Send + 'static,
    F: FnOnce(&T) -> T + Send + 'static,
{
    Intent::single(reducer::reducer(move |old: &T| {
        Ok(Narrow::<Sub>::narrow(old)
            .and_then(block)
            .unwrap_or_else(|| fallback(old)))
    }))
    .named("checked_intent")
}
