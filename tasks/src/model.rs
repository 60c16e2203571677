//! Domain types for the tasks screen.
//!
//! A task list is an ordered sequence of tasks plus the filter currently
//! applied to it. Tasks are identified by a stable string id that survives
//! edits.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    /// Stable identifier, unchanged by edits
    pub id: String,
    /// Short title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Whether the task is done
    pub completed: bool,
}

impl Task {
    /// Creates a blank task with a fresh random id
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Creates a blank task with the given id
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            completed: false,
        }
    }

    /// Returns a copy with the given title
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    /// Returns a copy with the given description
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    /// Returns a copy with the given completion flag
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Whether the task is still to do
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.completed
    }

    /// Whether both title and description are blank
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }

    /// Text shown in list rows: the title, or the description when untitled
    #[must_use]
    pub fn title_for_list(&self) -> &str {
        if self.title.is_empty() {
            &self.description
        } else {
            &self.title
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// Which tasks the list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterType {
    /// Every task
    #[default]
    Any,
    /// Tasks not completed yet
    Active,
    /// Completed tasks
    Complete,
}

impl FilterType {
    /// The next filter in the `Any → Active → Complete → Any` cycle
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Any => Self::Active,
            Self::Active => Self::Complete,
            Self::Complete => Self::Any,
        }
    }

    /// Whether `task` is visible under this filter
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::Any => true,
            Self::Active => !task.completed,
            Self::Complete => task.completed,
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Any => "All tasks",
            Self::Active => "Active tasks",
            Self::Complete => "Completed tasks",
        };
        f.write_str(label)
    }
}

/// State of the tasks screen
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksModelState {
    /// All tasks, in display order
    pub tasks: Vec<Task>,
    /// Current filter
    pub filter: FilterType,
}

impl TasksModelState {
    /// Creates a state holding `tasks` with no filter
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            filter: FilterType::Any,
        }
    }

    /// Tasks visible under the current filter, in list order
    pub fn filtered_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| self.filter.matches(task))
    }

    /// Returns a task by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of tasks not completed yet
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_active()).count()
    }

    /// Number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.active_count()
    }
}
