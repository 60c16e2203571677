//! User interactions emitted by the task screens.

use crate::model::Task;
use serde::{Deserialize, Serialize};

/// Interactions on the task list screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TasksViewEvent {
    /// "Clear completed" menu action
    ClearCompletedClick,
    /// Filter toggle
    FilterTypeClick,
    /// Pull-to-refresh gesture
    RefreshTasksSwipe,
    /// "Refresh" menu action
    RefreshTasksClick,
    /// Checkbox toggled on a list row
    CompleteTaskClick {
        /// The task as the row displayed it
        task: Task,
        /// New checkbox value
        checked: bool,
    },
}

/// Interactions on the add/edit task screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddEditTaskViewEvent {
    /// Title field changed
    TitleChange(String),
    /// Description field changed
    DescriptionChange(String),
}
