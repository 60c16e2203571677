//! # MVI Tasks
//!
//! A to-do list built on the MVI stores: a task list screen and an add/edit
//! task screen, each backed by its own [`ModelStore`](mvi_runtime::ModelStore).
//!
//! View events are mapped to intents ([`to_intent`],
//! [`AddEditTaskViewEvent::into_intent`]). Saving or deleting from the editor
//! goes through the [`EditorCoordinator`], which updates the task list and
//! reports the outcome back to the editor.
//!
//! ## Example
//!
//! ```
//! use mvi_runtime::StoreConfig;
//! use mvi_tasks::{Task, TasksSession, TasksViewEvent, build_add_task_intent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), mvi_runtime::StoreError> {
//! let session = TasksSession::new(StoreConfig::default());
//!
//! let task = Task::new().with_title("Buy milk");
//! session.tasks().process(build_add_task_intent(task.clone()))?.wait().await?;
//! session
//!     .on_tasks_event(TasksViewEvent::CompleteTaskClick { task, checked: true })?
//!     .wait()
//!     .await?;
//!
//! assert_eq!(session.tasks().current().completed_count(), 1);
//! session.shutdown().await
//! # }
//! ```

pub mod coordinator;
pub mod editor;
pub mod events;
pub mod intents;
pub mod model;
pub mod store;

pub use coordinator::EditorCoordinator;
pub use editor::{Closed, Deleting, Editing, Saving, TaskEditorState, editor_intent, editor_intents};
pub use events::{AddEditTaskViewEvent, TasksViewEvent};
pub use intents::{
    build_add_task_intent, delete_task_intent, to_intent, to_intents, upsert_task_intent,
};
pub use model::{FilterType, Task, TasksModelState};
pub use store::{TaskEditorStore, TasksSession};
