//! Deadline-gated queue of pending blocks.
//!
//! [`IntervalSchedule`] pairs a queue of blocks with a periodic clock: the
//! block at index `i` is due at `start + i * period`, where `start` is the
//! moment the schedule is first polled. Turning it into a stream releases one
//! reducer per deadline, in queue order.

use crate::intent::Block;
use crate::reducer::Reducer;
use async_stream::stream;
use futures::stream::Stream;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Queue of blocks released one per `period`
pub struct IntervalSchedule<S> {
    period: Duration,
    pending: VecDeque<Block<S>>,
}

impl<S> IntervalSchedule<S>
where
    S: Clone + 'static,
{
    /// Create a schedule over `blocks`, released every `period`
    pub fn new(period: Duration, blocks: impl IntoIterator<Item = Block<S>>) -> Self {
        Self {
            period,
            pending: blocks.into_iter().collect(),
        }
    }

    /// Number of blocks still queued
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The clock period
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Deadline of the block at `tick`, relative to `start`
    #[must_use]
    pub fn deadline(&self, start: Instant, tick: usize) -> Instant {
        deadline_at(start, self.period, tick)
    }

    /// Release the queued blocks as reducers, each at its deadline
    ///
    /// The clock starts on the first poll. Dropping the stream cancels every
    /// block not yet released.
    pub fn into_stream(self) -> impl Stream<Item = Reducer<S>> + Send
    where
        S: Send,
    {
        let Self { period, mut pending } = self;
        stream! {
            let start = Instant::now();
            let mut tick = 0usize;
            while let Some(block) = pending.pop_front() {
                if tick > 0 {
                    tokio::time::sleep_until(deadline_at(start, period, tick)).await;
                }
                tick += 1;
                let reducer: Reducer<S> = Box::new(move |old: &S| Ok(block(old.clone())));
                yield reducer;
            }
        }
    }
}

/// Stand-in deadline for ticks past what `Instant` can represent
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_at(start: Instant, period: Duration, tick: usize) -> Instant {
    let ticks = u32::try_from(tick).unwrap_or(u32::MAX);
    start
        .checked_add(period.saturating_mul(ticks))
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

impl<S> std::fmt::Debug for IntervalSchedule<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalSchedule")
            .field("period", &self.period)
            .field("pending", &self.pending.len())
            .finish()
    }
}
