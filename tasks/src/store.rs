//! Stores for the task screens.

use crate::coordinator::EditorCoordinator;
use crate::editor::TaskEditorState;
use crate::events::{AddEditTaskViewEvent, TasksViewEvent};
use crate::intents::to_intent;
use crate::model::TasksModelState;
use mvi_core::Intent;
use mvi_runtime::{IntentHandle, ModelStore, StateSubscription, StoreConfig, StoreError};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Editor store wired to the tasks store it saves into
///
/// Owns the coordinator task; dropping the store stops it.
#[derive(Debug)]
pub struct TaskEditorStore {
    store: ModelStore<TaskEditorState>,
    coordinator: JoinHandle<()>,
}

impl TaskEditorStore {
    /// Editor starting on a fresh blank task
    #[must_use]
    pub fn new(tasks: ModelStore<TasksModelState>) -> Self {
        Self::with_initial(tasks, TaskEditorState::default(), StoreConfig::default())
    }

    /// Editor starting in `initial`
    ///
    /// If `initial` is Saving or Deleting the coordinator acts on it right
    /// away.
    #[must_use]
    pub fn with_initial(
        tasks: ModelStore<TasksModelState>,
        initial: TaskEditorState,
        config: StoreConfig,
    ) -> Self {
        let store = ModelStore::with_config(initial, config);
        let coordinator = EditorCoordinator::new(tasks, store.clone()).spawn();
        Self { store, coordinator }
    }

    /// Queue an editor intent
    ///
    /// # Errors
    ///
    /// See [`ModelStore::process`].
    pub fn process(&self, intent: Intent<TaskEditorState>) -> Result<IntentHandle, StoreError> {
        self.store.process(intent)
    }

    /// Queue the intent for an add/edit screen event
    ///
    /// # Errors
    ///
    /// See [`ModelStore::process`].
    pub fn on_event(&self, event: AddEditTaskViewEvent) -> Result<IntentHandle, StoreError> {
        self.store.process(event.into_intent())
    }

    /// Subscribe to editor snapshots
    #[must_use]
    pub fn model_state(&self) -> StateSubscription<TaskEditorState> {
        self.store.model_state()
    }

    /// The latest editor snapshot
    #[must_use]
    pub fn current(&self) -> Arc<TaskEditorState> {
        self.store.current()
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &ModelStore<TaskEditorState> {
        &self.store
    }

    /// Stop the coordinator, then the editor store
    ///
    /// # Errors
    ///
    /// See [`ModelStore::shutdown`].
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.coordinator.abort();
        self.store.shutdown().await
    }
}

impl Drop for TaskEditorStore {
    fn drop(&mut self) {
        // The coordinator holds a clone of the editor store
        self.coordinator.abort();
    }
}

/// The tasks store and its editor, built and torn down together
#[derive(Debug)]
pub struct TasksSession {
    tasks: ModelStore<TasksModelState>,
    editor: TaskEditorStore,
}

impl TasksSession {
    /// Start an empty task list and an editor on a blank task
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self::with_state(TasksModelState::default(), TaskEditorState::default(), config)
    }

    /// Start from given states
    #[must_use]
    pub fn with_state(
        tasks: TasksModelState,
        editor: TaskEditorState,
        config: StoreConfig,
    ) -> Self {
        let tasks = ModelStore::with_config(tasks, config.clone());
        let editor = TaskEditorStore::with_initial(tasks.clone(), editor, config);
        tracing::info!("Tasks session started");
        Self { tasks, editor }
    }

    /// The tasks store
    #[must_use]
    pub const fn tasks(&self) -> &ModelStore<TasksModelState> {
        &self.tasks
    }

    /// The editor store
    #[must_use]
    pub const fn editor(&self) -> &TaskEditorStore {
        &self.editor
    }

    /// Queue the intent for a list screen event
    ///
    /// # Errors
    ///
    /// See [`ModelStore::process`].
    pub fn on_tasks_event(&self, event: TasksViewEvent) -> Result<IntentHandle, StoreError> {
        self.tasks.process(to_intent(event))
    }

    /// Queue the intent for an add/edit screen event
    ///
    /// # Errors
    ///
    /// See [`ModelStore::process`].
    pub fn on_editor_event(&self, event: AddEditTaskViewEvent) -> Result<IntentHandle, StoreError> {
        self.editor.on_event(event)
    }

    /// Shut down the editor, then the tasks store
    ///
    /// Both are attempted; the first error is returned.
    ///
    /// # Errors
    ///
    /// See [`ModelStore::shutdown`].
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        let editor = self.editor.shutdown().await;
        let tasks = self.tasks.shutdown().await;
        tracing::info!("Tasks session stopped");
        editor.and(tasks)
    }
}
