use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use gitmessages::rotation::{RotationError, RotationStore};

fn memory_store(items: &[&str]) -> RotationStore {
    let store = RotationStore::open_in_memory().expect("open store");
    store.load(items).expect("load pool");
    store
}

fn numbered_pool(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("message {}", i)).collect()
}

#[test]
fn test_no_repeat_within_cycle() {
    let pool = numbered_pool(25);
    let store = RotationStore::open_in_memory().unwrap();
    store.load(&pool).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..pool.len() {
        let item = store.draw().unwrap();
        assert!(seen.insert(item.id), "item {} served twice in one cycle", item.id);
    }
    assert_eq!(store.current_cycle().unwrap(), 0);
}

#[test]
fn test_three_item_scenario() {
    let store = memory_store(&["a", "b", "c"]);

    let ids: HashSet<i64> = (0..3).map(|_| store.draw().unwrap().id).collect();
    assert_eq!(ids, HashSet::from([1, 2, 3]));

    let stats = store.stats().unwrap();
    assert_eq!(stats.cycle, 0);
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.used_in_cycle, 3);
    assert_eq!(stats.remaining_in_cycle, 0);

    let fourth = store.draw().unwrap();
    assert!((1..=3).contains(&fourth.id));
    assert_eq!(store.current_cycle().unwrap(), 1);

    let new_cycle = store.usage_history(1).unwrap();
    assert_eq!(new_cycle.len(), 1);
    assert_eq!(new_cycle[0].item_id, fourth.id);
    assert_eq!(store.usage_history(0).unwrap().len(), 3);
}

#[test]
fn test_exhaustion_advances_cycle_by_exactly_one() {
    let store = memory_store(&["a", "b", "c", "d"]);
    for round in 0..3 {
        for _ in 0..4 {
            store.draw().unwrap();
        }
        assert_eq!(store.current_cycle().unwrap(), round);
        assert!(store.stats().unwrap().is_exhausted());
    }
    store.draw().unwrap();
    assert_eq!(store.current_cycle().unwrap(), 3);
}

#[test]
fn test_idempotent_load() {
    let store = memory_store(&["a", "", "b"]);
    assert_eq!(store.load(&["a", "b", "c", ""]).unwrap(), 0);
    assert_eq!(store.contents().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_duplicate_content_items_are_distinct() {
    let store = memory_store(&["same", "same"]);
    let first = store.draw().unwrap();
    let second = store.draw().unwrap();
    assert_eq!(first.content, second.content);
    assert_ne!(first.id, second.id);
    assert_eq!(store.current_cycle().unwrap(), 0);
}

#[test]
fn test_stats_track_draws() {
    let store = memory_store(&["a", "b", "c", "d", "e"]);
    for k in 1..=4 {
        store.draw().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.used_in_cycle, k);
        assert_eq!(stats.remaining_in_cycle, 5 - k);
    }
}

#[test]
fn test_force_new_cycle_keeps_history() {
    let store = memory_store(&["a", "b", "c"]);
    let drawn = store.draw().unwrap();

    store.force_new_cycle().unwrap();

    let stats = store.stats().unwrap();
    assert_eq!(stats.cycle, 1);
    assert_eq!(stats.used_in_cycle, 0);
    assert_eq!(stats.remaining_in_cycle, 3);

    let history = store.usage_history(0).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].item_id, drawn.id);
}

#[test]
fn test_empty_pool() {
    let store = RotationStore::open_in_memory().unwrap();
    let err = store.draw().unwrap_err();
    assert!(matches!(err, RotationError::EmptyPool));
    assert_eq!(err.code(), "NO_MESSAGES");

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_messages, 0);
    assert_eq!(stats.remaining_in_cycle, 0);
}

fn assert_cycle_usage(store: &RotationStore, cycle: i64, expected: usize) {
    let history = store.usage_history(cycle).unwrap();
    assert_eq!(history.len(), expected, "usage count for cycle {}", cycle);
    let ids: HashSet<i64> = history.iter().map(|record| record.item_id).collect();
    assert_eq!(ids.len(), history.len(), "duplicate item in cycle {}", cycle);
}

#[test]
fn test_concurrent_draws_roll_over_once_per_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(RotationStore::open(&dir.path().join("gitmessages.db")).unwrap());
    store.load(&numbered_pool(5)).unwrap();

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || store.draw())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_cycle_usage(&store, 0, 5);
    assert_cycle_usage(&store, 1, 5);
    assert_cycle_usage(&store, 2, 2);
    assert_eq!(store.current_cycle().unwrap(), 2);
}

#[test]
fn test_concurrent_draws_across_store_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gitmessages.db");
    let first = Arc::new(RotationStore::open(&path).unwrap());
    first.load(&numbered_pool(4)).unwrap();
    let second = Arc::new(RotationStore::open(&path).unwrap());
    assert_eq!(second.load(&numbered_pool(4)).unwrap(), 0);

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = if i % 2 == 0 { first.clone() } else { second.clone() };
            thread::spawn(move || store.draw())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_cycle_usage(&first, 0, 4);
    assert_cycle_usage(&first, 1, 4);
    assert_cycle_usage(&first, 2, 2);
    assert_eq!(second.current_cycle().unwrap(), 2);
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gitmessages.db");
    let drawn = {
        let store = RotationStore::open(&path).unwrap();
        store.load(&["a", "b", "c"]).unwrap();
        store.draw().unwrap()
    };

    let store = RotationStore::open(&path).unwrap();
    store.load(&["a", "b", "c"]).unwrap();
    let stats = store.stats().unwrap();
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.used_in_cycle, 1);

    for _ in 0..2 {
        assert_ne!(store.draw().unwrap().id, drawn.id);
    }
}
