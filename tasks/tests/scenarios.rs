//! End-to-end scenarios over live stores

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use futures::StreamExt;
use mvi_runtime::{ModelStore, StoreConfig};
use mvi_tasks::{
    AddEditTaskViewEvent, Editing, FilterType, Task, TaskEditorState, TaskEditorStore,
    TasksModelState, TasksSession, TasksViewEvent, build_add_task_intent, editor_intents,
    to_intent, to_intents,
};
use mvi_testing::{StateRecorder, helpers};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn milk() -> Task {
    Task::with_id("1").with_title("Buy milk")
}

#[tokio::test]
async fn buy_milk_scenario() {
    helpers::init_test_tracing();
    let store = ModelStore::new(TasksModelState::default());
    let recorder = StateRecorder::attach(&store);

    store.process(build_add_task_intent(milk())).unwrap();
    store
        .process(to_intent(TasksViewEvent::CompleteTaskClick {
            task: milk(),
            checked: true,
        }))
        .unwrap();
    store
        .process(to_intent(TasksViewEvent::ClearCompletedClick))
        .unwrap();
    helpers::settle(&store).await.unwrap();

    let tasks: Vec<Vec<Task>> = recorder.values().into_iter().map(|s| s.tasks).collect();
    assert_eq!(
        tasks,
        vec![
            vec![],
            vec![milk()],
            vec![milk().with_completed(true)],
            vec![],
        ]
    );
    assert_eq!(store.current().filter, FilterType::Any);
}

#[tokio::test]
async fn view_event_stream_drives_store() {
    let store = ModelStore::new(TasksModelState::new(vec![
        milk(),
        Task::with_id("2").with_title("Walk dog").with_completed(true),
    ]));

    let events = futures::stream::iter([
        TasksViewEvent::FilterTypeClick,
        TasksViewEvent::RefreshTasksSwipe,
        TasksViewEvent::ClearCompletedClick,
        TasksViewEvent::FilterTypeClick,
    ]);
    let mut intents = Box::pin(to_intents(events));
    while let Some(intent) = intents.next().await {
        store.process(intent).unwrap();
    }
    helpers::settle(&store).await.unwrap();

    let state = store.current();
    assert_eq!(state.filter, FilterType::Complete);
    assert_eq!(state.tasks, vec![milk()]);
    assert_eq!(state.filtered_tasks().count(), 0);
}

#[tokio::test]
async fn editor_saves_new_task_into_list() {
    let tasks = ModelStore::new(TasksModelState::default());
    let editor = TaskEditorStore::with_initial(
        tasks.clone(),
        TaskEditorState::Closed,
        StoreConfig::default(),
    );
    let recorder = StateRecorder::attach(editor.store());

    editor.process(editor_intents::new_task()).unwrap();
    editor
        .on_event(AddEditTaskViewEvent::TitleChange("Buy milk".into()))
        .unwrap();
    editor
        .on_event(AddEditTaskViewEvent::DescriptionChange("2 litres".into()))
        .unwrap();
    editor.process(editor_intents::save()).unwrap();

    // The replayed Closed snapshot comes first, so wait on the count
    assert!(recorder.wait_for_len(6, WAIT).await);

    let phases: Vec<_> = recorder.values().iter().map(|s| s.phase()).collect();
    assert_eq!(
        phases,
        vec!["closed", "editing", "editing", "editing", "saving", "closed"]
    );

    let saved = tasks.current();
    assert_eq!(saved.tasks.len(), 1);
    assert_eq!(saved.tasks[0].title, "Buy milk");
    assert_eq!(saved.tasks[0].description, "2 litres");
}

#[tokio::test]
async fn editor_updates_existing_task_in_place() {
    let session = TasksSession::with_state(
        TasksModelState::new(vec![milk(), Task::with_id("2").with_title("Walk dog")]),
        TaskEditorState::Closed,
        StoreConfig::default(),
    );
    let recorder = StateRecorder::attach(session.tasks());

    session
        .editor()
        .process(editor_intents::edit_task(milk()))
        .unwrap();
    session
        .on_editor_event(AddEditTaskViewEvent::TitleChange("Buy oat milk".into()))
        .unwrap();
    session.editor().process(editor_intents::save()).unwrap();

    let updated = recorder
        .wait_until(|s| s.tasks[0].title == "Buy oat milk", WAIT)
        .await
        .unwrap();
    assert_eq!(updated.tasks.len(), 2);
    assert_eq!(updated.tasks[0].id, "1");
    assert_eq!(updated.tasks[1].title, "Walk dog");

    session.shutdown().await.unwrap();
}

#[tokio::test]
async fn editor_deletes_task_from_list() {
    let tasks = ModelStore::new(TasksModelState::new(vec![milk()]));
    let editor = TaskEditorStore::with_initial(
        tasks.clone(),
        TaskEditorState::Editing(Editing::new(milk())),
        StoreConfig::default(),
    );
    let recorder = StateRecorder::attach(editor.store());

    editor.process(editor_intents::delete()).unwrap();

    let closed = recorder.wait_until(TaskEditorState::is_closed, WAIT).await;
    assert!(closed.is_some());
    assert!(tasks.current().tasks.is_empty());
}

#[tokio::test]
async fn ignored_edit_while_deleting_deletes_only_once() {
    let first = Task::with_id("1").with_title("first");
    let second = Task::with_id("1").with_title("second, same id");
    let tasks = ModelStore::new(TasksModelState::new(vec![first.clone(), second.clone()]));
    let editor = TaskEditorStore::with_initial(
        tasks.clone(),
        TaskEditorState::Editing(Editing::new(first)),
        StoreConfig::default(),
    );
    let recorder = StateRecorder::attach(editor.store());

    editor.process(editor_intents::delete()).unwrap();
    // Ignored while Deleting, so it republishes the Deleting snapshot
    editor
        .on_event(AddEditTaskViewEvent::TitleChange("x".into()))
        .unwrap();

    let closed = recorder.wait_until(TaskEditorState::is_closed, WAIT).await;
    assert!(closed.is_some());

    // Give the coordinator time to act on anything still buffered
    tokio::time::sleep(Duration::from_millis(100)).await;
    helpers::settle(&tasks).await.unwrap();

    let phases: Vec<_> = recorder.values().iter().map(|s| s.phase()).collect();
    assert_eq!(phases[..3], ["editing", "deleting", "deleting"]);
    assert_eq!(tasks.current().tasks, vec![second]);
}

#[tokio::test]
async fn editor_cancel_leaves_list_untouched() {
    let tasks = ModelStore::new(TasksModelState::new(vec![milk()]));
    let editor = TaskEditorStore::with_initial(
        tasks.clone(),
        TaskEditorState::Editing(Editing::new(milk())),
        StoreConfig::default(),
    );

    editor
        .on_event(AddEditTaskViewEvent::TitleChange("discarded".into()))
        .unwrap();
    editor.process(editor_intents::cancel()).unwrap();
    helpers::settle(editor.store()).await.unwrap();
    helpers::settle(&tasks).await.unwrap();

    assert_eq!(*editor.current(), TaskEditorState::Closed);
    assert_eq!(tasks.current().tasks, vec![milk()]);
}

#[tokio::test]
async fn dropping_editor_releases_its_store() {
    let tasks = ModelStore::new(TasksModelState::default());
    let editor = TaskEditorStore::new(tasks);
    let mut states = editor.model_state();
    assert!(states.next().await.is_some()); // replayed latest

    drop(editor);

    // Once the coordinator is gone nothing keeps the editor's apply loop alive
    let ended = tokio::time::timeout(WAIT, async {
        while states.next().await.is_some() {}
    })
    .await;
    assert!(ended.is_ok());
}
