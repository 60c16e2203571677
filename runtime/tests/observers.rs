//! Integration tests for how stores publish to observers
//!
//! Covers the ordering and timing guarantees observers rely on: every
//! snapshot in apply order, replay of the latest one on subscription, and
//! interval intents never observed ahead of their clock.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use mvi_core::{Block, Intent, interval_blocks_intent, reducer_intent};
use mvi_runtime::{ModelStore, StoreConfig};
use mvi_testing::{StateRecorder, helpers};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Test Fixtures
// ============================================================================

fn append(n: u32) -> Intent<Vec<u32>> {
    reducer_intent(move |v: &Vec<u32>| {
        let mut next = v.clone();
        next.push(n);
        Some(next)
    })
}

fn append_blocks(values: &[u32]) -> Vec<Block<Vec<u32>>> {
    values
        .iter()
        .map(|&n| -> Block<Vec<u32>> {
            Box::new(move |mut v: Vec<u32>| {
                v.push(n);
                v
            })
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn every_observer_sees_the_same_sequence() {
    helpers::init_test_tracing();
    let store = ModelStore::new(Vec::new());
    let first = StateRecorder::attach(&store);
    let second = StateRecorder::attach(&store);

    for n in 0..20 {
        store.process(append(n)).unwrap();
    }
    helpers::settle(&store).await.unwrap();

    assert!(first.wait_for_len(21, Duration::from_secs(1)).await);
    assert!(second.wait_for_len(21, Duration::from_secs(1)).await);
    assert_eq!(first.values(), second.values());

    let last = first.last().unwrap();
    assert_eq!(*last, (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn slow_observer_skips_oldest_snapshots() {
    let store = ModelStore::with_config(0_u32, StoreConfig::default().with_broadcast_capacity(4));
    let mut slow = store.model_state();
    assert_eq!(slow.next().await.as_deref(), Some(&0));

    for _ in 0..10 {
        store.process(reducer_intent(|n: &u32| Some(n + 1))).unwrap();
    }
    helpers::settle(&store).await.unwrap();

    // Only the newest snapshots are still buffered
    let mut seen = Vec::new();
    while let Some(state) = slow.try_next() {
        seen.push(*state);
    }
    assert_eq!(seen, vec![7, 8, 9, 10]);
}

#[tokio::test]
async fn subscription_stream_ends_with_store() {
    use futures::StreamExt;

    let store = ModelStore::new(String::from("a"));
    let states = store.model_state().into_stream();

    store
        .process(reducer_intent(|s: &String| Some(format!("{s}b"))))
        .unwrap()
        .wait()
        .await
        .unwrap();
    store.shutdown().await.unwrap();
    drop(store);

    let seen: Vec<String> = states.map(|s| String::clone(&s)).collect().await;
    assert_eq!(seen, vec!["a", "ab"]);
}

#[tokio::test(start_paused = true)]
async fn interval_reducers_are_never_observed_early() {
    let period = Duration::from_millis(250);
    let store = ModelStore::new(Vec::new());
    let mut states = store.model_state();
    let _ = states.next().await; // replayed initial

    let observed: Arc<Mutex<Vec<(usize, Duration)>>> = Arc::default();
    let started = Instant::now();
    let sink = Arc::clone(&observed);
    let observer = tokio::spawn(async move {
        while let Some(state) = states.next().await {
            sink.lock().unwrap().push((state.len(), started.elapsed()));
        }
    });

    let outcome = store
        .process(interval_blocks_intent(period, append_blocks(&[10, 20, 30, 40])))
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(outcome.applied(), 4);
    assert_eq!(*store.current(), vec![10, 20, 30, 40]);

    store.shutdown().await.unwrap();
    drop(store);
    observer.await.unwrap();

    let observed = observed.lock().unwrap().clone();
    assert_eq!(observed.len(), 4);
    for (i, (len, at)) in observed.into_iter().enumerate() {
        assert_eq!(len, i + 1);
        assert!(at >= period * u32::try_from(i).unwrap(), "block {i} observed at {at:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_interval_intent_publishes_nothing_more() {
    let store = ModelStore::new(Vec::new());
    let recorder = StateRecorder::attach(&store);

    let handle = store
        .process(interval_blocks_intent(
            Duration::from_secs(1),
            append_blocks(&[1, 2, 3]),
        ))
        .unwrap();
    helpers::settle(&store).await.unwrap();
    handle.cancel();

    tokio::time::sleep(Duration::from_secs(5)).await;
    helpers::settle(&store).await.unwrap();

    assert_eq!(recorder.values(), vec![vec![], vec![1]]);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn published_sequence_is_every_prefix(values in prop::collection::vec(any::<u32>(), 0..32)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let recorded = runtime.block_on(async {
            let store = ModelStore::new(Vec::new());
            let recorder = StateRecorder::attach(&store);
            for &n in &values {
                store.process(append(n)).unwrap();
            }
            helpers::settle(&store).await.unwrap();
            assert!(recorder.wait_for_len(values.len() + 1, Duration::from_secs(5)).await);
            recorder.values()
        });

        let expected: Vec<Vec<u32>> = (0..=values.len()).map(|i| values[..i].to_vec()).collect();
        prop_assert_eq!(recorded, expected);
    }
}
