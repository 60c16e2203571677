//! Intents over the task list.
//!
//! [`to_intent`] maps each [`TasksViewEvent`] to the intent that handles it;
//! the remaining constructors are used by the editor and by callers adding
//! tasks directly.

use crate::events::TasksViewEvent;
use crate::model::{Task, TasksModelState};
use futures::{Stream, StreamExt};
use mvi_core::{Intent, block_intent};

/// Map a list-screen event to its intent
///
/// # Example
///
/// ```
/// use mvi_tasks::{TasksViewEvent, to_intent};
///
/// let intent = to_intent(TasksViewEvent::FilterTypeClick);
/// assert_eq!(intent.name(), "cycle_filter");
/// ```
#[must_use]
pub fn to_intent(event: TasksViewEvent) -> Intent<TasksModelState> {
    match event {
        TasksViewEvent::ClearCompletedClick => clear_completed_intent(),
        TasksViewEvent::FilterTypeClick => cycle_filter_intent(),
        TasksViewEvent::RefreshTasksSwipe | TasksViewEvent::RefreshTasksClick => refresh_intent(),
        TasksViewEvent::CompleteTaskClick { task, checked } => complete_task_intent(task, checked),
    }
}

/// Map a stream of list-screen events to a stream of intents, in order
pub fn to_intents<St>(events: St) -> impl Stream<Item = Intent<TasksModelState>>
where
    St: Stream<Item = TasksViewEvent>,
{
    events.map(to_intent)
}

/// Append `task` to the list
///
/// Ids are not checked for collisions.
#[must_use]
pub fn build_add_task_intent(task: Task) -> Intent<TasksModelState> {
    block_intent(move |state: TasksModelState| {
        let mut tasks = state.tasks;
        tasks.push(task);
        Some(TasksModelState { tasks, ..state })
    })
    .named("add_task")
}

/// Replace the task with the same id, or append it if there is none
#[must_use]
pub fn upsert_task_intent(task: Task) -> Intent<TasksModelState> {
    block_intent(move |state: TasksModelState| {
        let mut tasks = state.tasks;
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
        Some(TasksModelState { tasks, ..state })
    })
    .named("upsert_task")
}

/// Remove the first task with id `task_id`; no-op if there is none
#[must_use]
pub fn delete_task_intent(task_id: String) -> Intent<TasksModelState> {
    block_intent(move |state: TasksModelState| {
        let mut tasks = state.tasks;
        if let Some(index) = tasks.iter().position(|task| task.id == task_id) {
            tasks.remove(index);
        } else {
            tracing::debug!(task_id = %task_id, "No task to delete");
        }
        Some(TasksModelState { tasks, ..state })
    })
    .named("delete_task")
}

fn clear_completed_intent() -> Intent<TasksModelState> {
    block_intent(|state: TasksModelState| {
        let tasks = state.tasks.into_iter().filter(Task::is_active).collect();
        Some(TasksModelState { tasks, ..state })
    })
    .named("clear_completed")
}

fn cycle_filter_intent() -> Intent<TasksModelState> {
    block_intent(|state: TasksModelState| {
        Some(TasksModelState {
            filter: state.filter.next(),
            ..state
        })
    })
    .named("cycle_filter")
}

// Tasks live in memory only, so there is nothing to reload
fn refresh_intent() -> Intent<TasksModelState> {
    block_intent(Some).named("refresh")
}

fn complete_task_intent(task: Task, checked: bool) -> Intent<TasksModelState> {
    block_intent(move |state: TasksModelState| {
        let mut tasks = state.tasks;
        if let Some(existing) = tasks.iter_mut().find(|existing| **existing == task) {
            existing.completed = checked;
        } else {
            // The row was stale: the task changed or went away since it was drawn
            tracing::debug!(task_id = %task.id, "Completion toggled on a task no longer listed");
        }
        Some(TasksModelState { tasks, ..state })
    })
    .named("complete_task")
}
