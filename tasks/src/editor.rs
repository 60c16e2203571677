//! Add/edit task screen state machine.
//!
//! ```text
//! Closed   --new_task / edit_task--> Editing
//! Editing  --edit-->                 Editing
//! Editing  --save-->                 Saving
//! Editing  --delete-->               Deleting
//! Editing  --cancel-->               Closed
//! Saving   --success-->              Closed
//! Saving   --failure-->              Editing
//! Deleting --success-->              Closed
//! ```
//!
//! Each phase payload carries the transitions valid from it, so an invalid
//! transition does not type-check. Intents built here are guarded: issued in
//! the wrong phase they leave the state unchanged.

use crate::events::AddEditTaskViewEvent;
use crate::model::Task;
use mvi_core::{Intent, Narrow, checked_intent};
use serde::{Deserialize, Serialize};

/// State of the add/edit task screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEditorState {
    /// No task open
    Closed,
    /// A task is being edited
    Editing(Editing),
    /// The edited task is being written to the task list
    Saving(Saving),
    /// The edited task is being removed from the task list
    Deleting(Deleting),
}

impl TaskEditorState {
    /// The task the editor holds, if any
    ///
    /// Deleting keeps only the task id, so it holds no task.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        match self {
            Self::Closed | Self::Deleting(_) => None,
            Self::Editing(Editing { task }) | Self::Saving(Saving { task }) => Some(task),
        }
    }

    /// Whether no task is open
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Short phase name, for logs
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Editing(_) => "editing",
            Self::Saving(_) => "saving",
            Self::Deleting(_) => "deleting",
        }
    }
}

impl Default for TaskEditorState {
    fn default() -> Self {
        Self::Editing(Editing::new(Task::new()))
    }
}

/// Payload of [`TaskEditorState::Closed`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Closed;

impl Closed {
    /// Open the editor on a fresh blank task
    #[must_use]
    pub fn new_task(&self) -> TaskEditorState {
        self.edit_task(Task::new())
    }

    /// Open the editor on an existing task
    #[must_use]
    pub const fn edit_task(&self, task: Task) -> TaskEditorState {
        TaskEditorState::Editing(Editing { task })
    }
}

/// Payload of [`TaskEditorState::Editing`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editing {
    /// Task being edited
    pub task: Task,
}

impl Editing {
    /// Wrap `task` for editing
    #[must_use]
    pub const fn new(task: Task) -> Self {
        Self { task }
    }

    /// Apply `edit` to the task and keep editing
    #[must_use]
    pub fn edit<F>(&self, edit: F) -> TaskEditorState
    where
        F: FnOnce(Task) -> Task,
    {
        TaskEditorState::Editing(Self::new(edit(self.task.clone())))
    }

    /// Request the task be saved
    #[must_use]
    pub fn save(&self) -> TaskEditorState {
        TaskEditorState::Saving(Saving {
            task: self.task.clone(),
        })
    }

    /// Request the task be deleted
    #[must_use]
    pub fn delete(&self) -> TaskEditorState {
        TaskEditorState::Deleting(Deleting {
            task_id: self.task.id.clone(),
        })
    }

    /// Close the editor, discarding edits
    #[must_use]
    pub const fn cancel(&self) -> TaskEditorState {
        TaskEditorState::Closed
    }
}

/// Payload of [`TaskEditorState::Saving`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saving {
    /// Task being saved
    pub task: Task,
}

impl Saving {
    /// The task was saved
    #[must_use]
    pub const fn success(&self) -> TaskEditorState {
        TaskEditorState::Closed
    }

    /// The task could not be saved; go back to editing it
    #[must_use]
    pub fn failure(&self) -> TaskEditorState {
        TaskEditorState::Editing(Editing::new(self.task.clone()))
    }
}

/// Payload of [`TaskEditorState::Deleting`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleting {
    /// Id of the task being deleted
    pub task_id: String,
}

impl Deleting {
    /// The task was deleted
    #[must_use]
    pub const fn success(&self) -> TaskEditorState {
        TaskEditorState::Closed
    }
}

impl Narrow<Closed> for TaskEditorState {
    fn narrow(&self) -> Option<&Closed> {
        match self {
            Self::Closed => Some(&Closed),
            _ => None,
        }
    }
}

impl Narrow<Editing> for TaskEditorState {
    fn narrow(&self) -> Option<&Editing> {
        match self {
            Self::Editing(editing) => Some(editing),
            _ => None,
        }
    }
}

impl Narrow<Saving> for TaskEditorState {
    fn narrow(&self) -> Option<&Saving> {
        match self {
            Self::Saving(saving) => Some(saving),
            _ => None,
        }
    }
}

impl Narrow<Deleting> for TaskEditorState {
    fn narrow(&self) -> Option<&Deleting> {
        match self {
            Self::Deleting(deleting) => Some(deleting),
            _ => None,
        }
    }
}

/// Build an intent applying `transition` while the editor is in phase `P`
///
/// In any other phase the state is kept as is.
pub fn editor_intent<P, F>(name: &'static str, transition: F) -> Intent<TaskEditorState>
where
    P: 'static,
    TaskEditorState: Narrow<P>,
    F: FnOnce(&P) -> TaskEditorState + Send + 'static,
{
    checked_intent(
        move |phase: &P| Some(transition(phase)),
        move |state: &TaskEditorState| {
            tracing::debug!(intent = name, phase = state.phase(), "Editor intent ignored");
            state.clone()
        },
    )
    .named(name)
}

/// Guarded editor intents
pub mod editor_intents {
    use super::{Closed, Deleting, Editing, Saving, TaskEditorState, editor_intent};
    use crate::model::Task;
    use mvi_core::Intent;

    /// `Closed → Editing` on a blank task
    #[must_use]
    pub fn new_task() -> Intent<TaskEditorState> {
        editor_intent("editor_new_task", Closed::new_task)
    }

    /// `Closed → Editing` on `task`
    #[must_use]
    pub fn edit_task(task: Task) -> Intent<TaskEditorState> {
        editor_intent("editor_edit_task", move |closed: &Closed| closed.edit_task(task))
    }

    /// `Editing → Editing` with `edit` applied to the task
    #[must_use]
    pub fn edit<F>(edit: F) -> Intent<TaskEditorState>
    where
        F: FnOnce(Task) -> Task + Send + 'static,
    {
        editor_intent("editor_edit", move |editing: &Editing| editing.edit(edit))
    }

    /// `Editing → Saving`
    #[must_use]
    pub fn save() -> Intent<TaskEditorState> {
        editor_intent("editor_save", Editing::save)
    }

    /// `Editing → Deleting`
    #[must_use]
    pub fn delete() -> Intent<TaskEditorState> {
        editor_intent("editor_delete", Editing::delete)
    }

    /// `Editing → Closed`
    #[must_use]
    pub fn cancel() -> Intent<TaskEditorState> {
        editor_intent("editor_cancel", Editing::cancel)
    }

    /// `Saving → Closed`
    #[must_use]
    pub fn save_succeeded() -> Intent<TaskEditorState> {
        editor_intent("editor_save_succeeded", Saving::success)
    }

    /// `Saving → Editing`
    #[must_use]
    pub fn save_failed() -> Intent<TaskEditorState> {
        editor_intent("editor_save_failed", Saving::failure)
    }

    /// `Deleting → Closed`
    #[must_use]
    pub fn delete_succeeded() -> Intent<TaskEditorState> {
        editor_intent("editor_delete_succeeded", Deleting::success)
    }
}

impl AddEditTaskViewEvent {
    /// Map this event to an editor intent
    ///
    /// Field changes only apply while editing.
    #[must_use]
    pub fn into_intent(self) -> Intent<TaskEditorState> {
        match self {
            Self::TitleChange(title) => editor_intents::edit(move |task| task.with_title(title)),
            Self::DescriptionChange(description) => {
                editor_intents::edit(move |task| task.with_description(description))
            }
        }
    }
}
