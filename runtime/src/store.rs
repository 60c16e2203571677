//! The serialized model store.
//!
//! Every [`ModelStore`] owns one apply loop running on a tokio task. Producers
//! hand intents to the loop over an unbounded channel, so `process()` never
//! blocks. The loop is the only writer of the state:
//!
//! ```text
//!  producers ──process()──▶ intake ──▶ apply loop ──publish──▶ observers
//!                                        │    ▲
//!                                        ▼    │ timed reducers
//!                                     pending intents
//! ```
//!
//! When an intent arrives the loop drains every reducer the intent can release
//! right away, in order. Whatever is left (reducers gated on a clock) joins the
//! pending set and is applied when released. Each reducer is applied to the
//! current snapshot and its result published before the next one runs.

use crate::config::{FaultPolicy, StoreConfig};
use crate::error::StoreError;
use crate::handle::{IntentHandle, IntentOutcome};
use crate::metrics::StoreMetrics;
use crate::subscription::StateSubscription;
use futures::FutureExt;
use futures::stream::{
    self, AbortHandle, AbortRegistration, Abortable, BoxStream, SelectAll, StreamExt,
};
use mvi_core::{Intent, Reducer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

type Completion = oneshot::Sender<Result<IntentOutcome, StoreError>>;

enum Command<S> {
    Process {
        id: u64,
        intent: Intent<S>,
        registration: AbortRegistration,
        abort: AbortHandle,
        done: Completion,
    },
    Shutdown,
}

/// Latest snapshot plus the fan-out channel, updated together
struct Published<S> {
    latest: Mutex<Arc<S>>,
    sender: broadcast::Sender<Arc<S>>,
}

impl<S> Published<S>
where
    S: Send + Sync + 'static,
{
    fn new(initial: S, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            latest: Mutex::new(Arc::new(initial)),
            sender,
        }
    }

    fn latest(&self) -> Arc<S> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*latest)
    }

    fn publish(&self, state: Arc<S>) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest = Arc::clone(&state);
        // No receivers is fine: nobody is observing yet
        let _ = self.sender.send(state);
    }

    fn subscribe(&self) -> StateSubscription<S> {
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        StateSubscription::new(Arc::clone(&*latest), self.sender.subscribe())
    }
}

struct Inner<S> {
    intake: mpsc::UnboundedSender<Command<S>>,
    published: Arc<Published<S>>,
    halted: Arc<AtomicBool>,
    shutdown: AtomicBool,
    next_id: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
    config: StoreConfig,
}

/// The single authoritative holder of one state slice
///
/// Cloning the store clones a handle to the same state and apply loop.
///
/// # Example
///
/// ```
/// use mvi_core::reducer_intent;
/// use mvi_runtime::ModelStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), mvi_runtime::StoreError> {
/// let store = ModelStore::new(String::from("a"));
///
/// store.process(reducer_intent(|s: &String| Some(format!("{s}b"))))?;
/// let outcome = store
///     .process(reducer_intent(|s: &String| Some(format!("{s}c"))))?
///     .wait()
///     .await?;
///
/// assert_eq!(outcome.applied(), 1);
/// assert_eq!(store.state(String::clone), "abc");
/// # Ok(())
/// # }
/// ```
pub struct ModelStore<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for ModelStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> std::fmt::Debug for ModelStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("halted", &self.inner.halted.load(Ordering::Acquire))
            .field("shutdown", &self.inner.shutdown.load(Ordering::Acquire))
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<S> ModelStore<S>
where
    S: Send + Sync + 'static,
{
    /// Create a store with default configuration
    ///
    /// Spawns the apply loop, so this must be called from within a tokio
    /// runtime.
    #[must_use]
    pub fn new(initial_state: S) -> Self {
        Self::with_config(initial_state, StoreConfig::default())
    }

    /// Create a store with custom configuration
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = StoreConfig::default().with_fault_policy(FaultPolicy::Continue);
    /// let store = ModelStore::with_config(TasksModelState::default(), config);
    /// ```
    #[must_use]
    pub fn with_config(initial_state: S, config: StoreConfig) -> Self {
        let (intake, commands) = mpsc::unbounded_channel();
        let published = Arc::new(Published::new(initial_state, config.broadcast_capacity));
        let halted = Arc::new(AtomicBool::new(false));

        let apply_loop = ApplyLoop {
            state: published.latest(),
            published: Arc::clone(&published),
            halted: Arc::clone(&halted),
            fault_policy: config.fault_policy,
            commands,
            pending: SelectAll::new(),
            tracked: HashMap::new(),
        };
        let worker = tokio::spawn(apply_loop.run());

        Self {
            inner: Arc::new(Inner {
                intake,
                published,
                halted,
                shutdown: AtomicBool::new(false),
                next_id: AtomicU64::new(0),
                worker: Mutex::new(Some(worker)),
                config,
            }),
        }
    }

    /// Queue an intent
    ///
    /// Returns immediately. The intent's reducers are applied by the apply
    /// loop in arrival order; use the returned handle to wait for them or to
    /// cancel the ones not yet released.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown)
    /// - [`StoreError::Halted`] after an inconsistent reducer under
    ///   [`FaultPolicy::Halt`]
    /// - [`StoreError::ChannelClosed`] if the apply loop has stopped
    #[tracing::instrument(skip(self, intent), fields(intent = %intent.name()), name = "store_process")]
    pub fn process(&self, intent: Intent<S>) -> Result<IntentHandle, StoreError> {
        if self.inner.shutdown.load(Ordering::Acquire) {
            tracing::warn!("Rejected intent: store is shutting down");
            StoreMetrics::record_rejected();
            return Err(StoreError::ShutdownInProgress);
        }
        if self.inner.halted.load(Ordering::Acquire) {
            tracing::warn!("Rejected intent: store is halted");
            StoreMetrics::record_rejected();
            return Err(StoreError::Halted);
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let name = intent.name().to_owned();
        let (abort, registration) = AbortHandle::new_pair();
        let (done, completion) = oneshot::channel();

        self.inner
            .intake
            .send(Command::Process {
                id,
                intent,
                registration,
                abort: abort.clone(),
                done,
            })
            .map_err(|_| StoreError::ChannelClosed)?;

        StoreMetrics::record_intent();
        tracing::debug!(intent_id = id, "Queued intent");

        Ok(IntentHandle::new(id, name, abort, completion))
    }

    /// Subscribe to the store's snapshots
    ///
    /// The subscription yields the latest snapshot first, then every
    /// subsequent one in the order reducers were applied.
    #[must_use]
    pub fn model_state(&self) -> StateSubscription<S> {
        self.inner.published.subscribe()
    }

    /// The latest published snapshot
    #[must_use]
    pub fn current(&self) -> Arc<S> {
        self.inner.published.latest()
    }

    /// Read the latest snapshot through a closure
    ///
    /// ```ignore
    /// let count = store.state(|s| s.tasks.len());
    /// ```
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.current())
    }

    /// Whether the store halted after an inconsistent reducer
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.inner.halted.load(Ordering::Acquire)
    }

    /// The store's configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Stop the store
    ///
    /// Rejects new intents, cancels pending timed intents (their handles
    /// report [`IntentOutcome::Cancelled`]) and waits for the apply loop to
    /// exit. The last published snapshot stays readable through
    /// [`current`](Self::current). Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if the apply loop does not stop
    /// within the configured timeout.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        tracing::info!("Initiating store shutdown");
        self.inner.shutdown.store(true, Ordering::Release);

        // The loop may already be gone (halted); that's fine
        let _ = self.inner.intake.send(Command::Shutdown);

        let worker = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return Ok(());
        };

        let timeout = self.inner.config.shutdown_timeout;
        match tokio::time::timeout(timeout, worker).await {
            Ok(Ok(())) => {
                tracing::info!("Store shutdown complete");
                Ok(())
            }
            Ok(Err(error)) => {
                tracing::error!(%error, "Apply loop terminated abnormally");
                Err(StoreError::ChannelClosed)
            }
            Err(_) => {
                tracing::error!(?timeout, "Store shutdown timed out");
                Err(StoreError::ShutdownTimeout(timeout))
            }
        }
    }
}

enum Step<S> {
    Apply { id: u64, reducer: Reducer<S> },
    Finished { id: u64 },
}

struct Tracked {
    name: String,
    applied: usize,
    abort: AbortHandle,
    done: Completion,
}

impl Tracked {
    fn complete(self) {
        let outcome = if self.abort.is_aborted() {
            IntentOutcome::Cancelled {
                applied: self.applied,
            }
        } else {
            IntentOutcome::Completed {
                applied: self.applied,
            }
        };
        tracing::debug!(intent = %self.name, ?outcome, "Intent finished");
        // The caller may have dropped its handle
        let _ = self.done.send(Ok(outcome));
    }

    fn fail(self, error: StoreError) {
        self.abort.abort();
        let _ = self.done.send(Err(error));
    }
}

enum Exit {
    Closed,
    Shutdown,
    Halted,
}

struct ApplyLoop<S> {
    state: Arc<S>,
    published: Arc<Published<S>>,
    halted: Arc<AtomicBool>,
    fault_policy: FaultPolicy,
    commands: mpsc::UnboundedReceiver<Command<S>>,
    pending: SelectAll<BoxStream<'static, Step<S>>>,
    tracked: HashMap<u64, Tracked>,
}

impl<S> ApplyLoop<S>
where
    S: Send + Sync + 'static,
{
    async fn run(mut self) {
        tracing::debug!("Apply loop started");

        let exit = loop {
            if self.halted.load(Ordering::Acquire) {
                break Exit::Halted;
            }

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Process { id, intent, registration, abort, done }) => {
                        self.admit(id, intent, registration, abort, done);
                    }
                    Some(Command::Shutdown) => break Exit::Shutdown,
                    None => break Exit::Closed,
                },

                Some(step) = self.pending.next(), if !self.pending.is_empty() => {
                    self.step(step);
                }
            }
        };

        self.drain(&exit);
        tracing::debug!("Apply loop stopped");
    }

    /// Register an intent and apply everything it releases right away
    fn admit(
        &mut self,
        id: u64,
        intent: Intent<S>,
        registration: AbortRegistration,
        abort: AbortHandle,
        done: Completion,
    ) {
        let name = intent.name().to_owned();
        tracing::debug!(intent_id = id, intent = %name, "Admitting intent");

        let mut steps = Abortable::new(intent.reducers(), registration)
            .map(move |reducer| Step::Apply { id, reducer })
            .chain(stream::once(futures::future::ready(Step::Finished { id })))
            .boxed();

        self.tracked.insert(
            id,
            Tracked {
                name,
                applied: 0,
                abort,
                done,
            },
        );

        // Ready reducers are applied in order before anything else is looked at
        loop {
            match steps.next().now_or_never() {
                Some(Some(step)) => {
                    let finished = matches!(step, Step::Finished { .. });
                    self.step(step);
                    if finished {
                        return;
                    }
                }
                Some(None) => return,
                None => {
                    self.pending.push(steps);
                    return;
                }
            }
        }
    }

    fn step(&mut self, step: Step<S>) {
        match step {
            Step::Apply { id, reducer } => self.apply(id, reducer),
            Step::Finished { id } => {
                if let Some(tracked) = self.tracked.remove(&id) {
                    tracked.complete();
                }
            }
        }
    }

    fn apply(&mut self, id: u64, reducer: Reducer<S>) {
        // Already failed or halted: its remaining reducers are discarded
        let Some(tracked) = self.tracked.get_mut(&id) else {
            return;
        };

        let span = tracing::trace_span!("reducer_execution", intent_id = id);
        let _enter = span.enter();

        let start = std::time::Instant::now();
        match reducer(self.state.as_ref()) {
            Ok(next) => {
                StoreMetrics::record_reducer(start.elapsed());
                tracked.applied += 1;
                self.state = Arc::new(next);
                self.published.publish(Arc::clone(&self.state));
                tracing::trace!(applied = tracked.applied, "Reducer applied and published");
            }
            Err(source) => {
                StoreMetrics::record_inconsistent();
                let Some(tracked) = self.tracked.remove(&id) else {
                    return;
                };
                tracing::error!(
                    intent_id = id,
                    intent = %tracked.name,
                    error = %source,
                    fault_policy = ?self.fault_policy,
                    "Reducer produced an inconsistent state"
                );
                let intent = tracked.name.clone();
                tracked.fail(StoreError::Reducer { intent, source });

                if self.fault_policy == FaultPolicy::Halt {
                    self.halted.store(true, Ordering::Release);
                }
            }
        }
    }

    /// Settle every intent still tracked when the loop exits
    fn drain(&mut self, exit: &Exit) {
        for (_, tracked) in self.tracked.drain() {
            match exit {
                Exit::Halted => tracked.fail(StoreError::Halted),
                Exit::Shutdown | Exit::Closed => {
                    tracked.abort.abort();
                    tracked.complete();
                }
            }
        }

        // Intents queued behind the exit never ran
        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            if let Command::Process { done, .. } = command {
                let error = match exit {
                    Exit::Halted => StoreError::Halted,
                    Exit::Shutdown | Exit::Closed => StoreError::ShutdownInProgress,
                };
                let _ = done.send(Err(error));
            }
        }
    }
}
