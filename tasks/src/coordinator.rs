//! Side effects of the editor's Saving and Deleting phases.
//!
//! The coordinator observes the editor store and, when the editor enters a
//! phase that needs the task list, updates the tasks store and reports back
//! to the editor with a guarded intent.

use crate::editor::{Deleting, Saving, TaskEditorState, editor_intents};
use crate::intents::{delete_task_intent, upsert_task_intent};
use crate::model::TasksModelState;
use mvi_runtime::{ModelStore, StoreError};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Connects an editor store to the tasks store it edits
#[derive(Clone, Debug)]
pub struct EditorCoordinator {
    tasks: ModelStore<TasksModelState>,
    editor: ModelStore<TaskEditorState>,
}

impl EditorCoordinator {
    /// Create a coordinator between `editor` and `tasks`
    #[must_use]
    pub const fn new(
        tasks: ModelStore<TasksModelState>,
        editor: ModelStore<TaskEditorState>,
    ) -> Self {
        Self { tasks, editor }
    }

    /// Start reacting to the editor entering Saving or Deleting
    ///
    /// The subscription is taken before this returns, so no snapshot
    /// published afterwards is missed. A snapshot repeating the phase of the
    /// one before it is skipped, so each save or delete runs once. The task
    /// runs until the editor store stops publishing or the handle is aborted.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        let mut states = self.editor.model_state();
        tokio::spawn(async move {
            let mut previous: Option<Arc<TaskEditorState>> = None;
            while let Some(state) = states.next().await {
                if enters_effect_phase(previous.as_deref(), &state) {
                    if let Err(error) = self.handle_state(&state).await {
                        tracing::error!(
                            phase = state.phase(),
                            error = %error,
                            "Editor coordination failed"
                        );
                    }
                } else {
                    tracing::trace!(phase = state.phase(), "Editor snapshot needs no coordination");
                }
                previous = Some(state);
            }
            tracing::debug!("Editor coordinator stopped");
        })
    }

    /// React to one editor snapshot
    ///
    /// # Errors
    ///
    /// Returns the editor store's error if it rejects the follow-up intent.
    pub async fn handle_state(&self, state: &TaskEditorState) -> Result<(), StoreError> {
        match state {
            TaskEditorState::Saving(saving) => self.handle_saving(saving).await,
            TaskEditorState::Deleting(deleting) => self.handle_deleting(deleting).await,
            TaskEditorState::Closed | TaskEditorState::Editing(_) => Ok(()),
        }
    }

    #[tracing::instrument(skip_all, fields(task_id = %saving.task.id))]
    async fn handle_saving(&self, saving: &Saving) -> Result<(), StoreError> {
        if saving.task.is_empty() {
            tracing::warn!("Refusing to save an empty task");
            self.editor.process(editor_intents::save_failed())?;
            return Ok(());
        }

        let upsert = async {
            self.tasks
                .process(upsert_task_intent(saving.task.clone()))?
                .wait()
                .await
        };

        match upsert.await {
            Ok(_) => {
                tracing::debug!("Task saved");
                self.editor.process(editor_intents::save_succeeded())?;
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to save task");
                self.editor.process(editor_intents::save_failed())?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(task_id = %deleting.task_id))]
    async fn handle_deleting(&self, deleting: &Deleting) -> Result<(), StoreError> {
        let delete = async {
            self.tasks
                .process(delete_task_intent(deleting.task_id.clone()))?
                .wait()
                .await
        };

        // Closing the editor is right either way: the task is gone or the
        // list can no longer change
        if let Err(error) = delete.await {
            tracing::error!(error = %error, "Failed to delete task");
        } else {
            tracing::debug!("Task deleted");
        }
        self.editor.process(editor_intents::delete_succeeded())?;
        Ok(())
    }
}

/// Whether `state` starts a Saving or Deleting phase
///
/// Guarded intents ignored during those phases republish an identical
/// snapshot, which must not repeat the side effect.
fn enters_effect_phase(previous: Option<&TaskEditorState>, state: &TaskEditorState) -> bool {
    let effectful = matches!(
        state,
        TaskEditorState::Saving(_) | TaskEditorState::Deleting(_)
    );
    effectful && previous.is_none_or(|previous| previous.phase() != state.phase())
}
