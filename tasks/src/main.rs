//! Tasks demo binary
//!
//! Walks through the list and editor screens without a UI: seeds a few
//! tasks on a timer, toggles and filters them, edits one through the editor,
//! then prints the final list and the collected metrics.

use anyhow::Context;
use mvi_core::{Block, interval_blocks_intent};
use mvi_runtime::StoreConfig;
use mvi_runtime::metrics::MetricsRecorder;
use mvi_tasks::{
    AddEditTaskViewEvent, Task, TaskEditorState, TasksModelState, TasksSession, TasksViewEvent,
    editor_intents,
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mvi_tasks=debug,mvi_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut metrics = MetricsRecorder::new();
    metrics.install().context("installing metrics recorder")?;

    println!("=== Tasks Example: Model-View-Intent ===\n");

    let session = TasksSession::with_state(
        TasksModelState::default(),
        TaskEditorState::Closed,
        StoreConfig::default(),
    );

    // Seed tasks one every 200ms
    println!(">>> Seeding tasks on a 200ms clock");
    let seeds: Vec<Block<TasksModelState>> = ["Buy milk", "Walk the dog", "Write report"]
        .into_iter()
        .map(|title| -> Block<TasksModelState> {
            Box::new(move |state: TasksModelState| {
                let mut tasks = state.tasks;
                tasks.push(Task::new().with_title(title));
                TasksModelState { tasks, ..state }
            })
        })
        .collect();
    let outcome = session
        .tasks()
        .process(interval_blocks_intent(Duration::from_millis(200), seeds).named("seed_tasks"))?
        .wait()
        .await?;
    println!("Seeded {} tasks", outcome.applied());
    print_tasks(&session.tasks().current());

    // Complete the first one
    let first = session
        .tasks()
        .state(|s| s.tasks.first().cloned())
        .context("seeded list is empty")?;
    println!("\n>>> Completing \"{}\"", first.title_for_list());
    session
        .on_tasks_event(TasksViewEvent::CompleteTaskClick {
            task: first,
            checked: true,
        })?
        .wait()
        .await?;

    println!(">>> Cycling filter");
    session.on_tasks_event(TasksViewEvent::FilterTypeClick)?.wait().await?;
    print_tasks(&session.tasks().current());

    // Edit the second task through the editor
    let second = session
        .tasks()
        .state(|s| s.tasks.get(1).cloned())
        .context("seeded list is too short")?;
    println!("\n>>> Editing \"{}\"", second.title_for_list());
    let editor = session.editor();
    let mut editor_states = editor.model_state();
    editor.process(editor_intents::edit_task(second))?;
    editor.on_event(AddEditTaskViewEvent::TitleChange("Walk the dog twice".into()))?;
    editor.on_event(AddEditTaskViewEvent::DescriptionChange("Morning and evening".into()))?;
    editor.process(editor_intents::save())?;

    // The first snapshot is the replayed Closed state
    let mut saved = false;
    while let Some(state) = editor_states.next().await {
        println!("  editor: {}", state.phase());
        saved |= matches!(*state, TaskEditorState::Saving(_));
        if saved && state.is_closed() {
            break;
        }
    }

    println!(">>> Clearing completed");
    session.on_tasks_event(TasksViewEvent::ClearCompletedClick)?.wait().await?;
    print_tasks(&session.tasks().current());

    let json = serde_json::to_string_pretty(&*session.tasks().current())?;
    println!("\nFinal state:\n{json}");

    session.shutdown().await?;

    if let Some(rendered) = metrics.render() {
        println!("\nMetrics:\n{rendered}");
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}

fn print_tasks(state: &TasksModelState) {
    println!("{}:", state.filter);
    for task in state.filtered_tasks() {
        let mark = if task.completed { "x" } else { " " };
        println!("  [{mark}] {}", task.title_for_list());
    }
}
