use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use warden_state::{
    DiscoveryState, JsonFileStateStore, MemoryStateStore, Phase, SqliteStateStore, StateStore,
    StoreError,
};

fn sample_state() -> DiscoveryState {
    let mut state = DiscoveryState::new();
    state.begin("/home/site", "/home/site/public_html");
    state.stack.push("/home/site/".to_string());
    state.stack.push("/home/site/tmp/".to_string());
    state.seen.insert("/home/site/tmp".to_string());
    state.seen.insert("/home/site/tmp/x.php".to_string());
    state.collected_files.push("/home/site/tmp/x.php".to_string());
    state.skipped_count = 4;
    state.invocations = 3;
    state
}

fn assert_round_trip(store: &dyn StateStore) {
    let fresh = store.load_state("external").unwrap();
    assert_eq!(fresh.phase, Phase::NotStarted);

    let state = sample_state();
    store.save_state("external", &state).unwrap();
    assert_eq!(store.load_state("external").unwrap(), state);

    store.reset_state("external").unwrap();
    assert_eq!(store.load_state("external").unwrap().phase, Phase::NotStarted);
}

#[test]
fn test_memory_store_round_trip() {
    assert_round_trip(&MemoryStateStore::new());
}

#[test]
fn test_sqlite_store_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = SqliteStateStore::new(temp.path().join("state.db")).unwrap();
    assert_round_trip(&store);
}

#[test]
fn test_json_file_store_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStateStore::new(temp.path().join("checkpoints")).unwrap();
    assert_round_trip(&store);
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("state.db");
    let state = sample_state();

    {
        let store = SqliteStateStore::new(&db_path).unwrap();
        store.save_state("external", &state).unwrap();
    }

    let reopened = SqliteStateStore::new(&db_path).unwrap();
    assert_eq!(reopened.load_state("external").unwrap(), state);
}

#[test]
fn test_sqlite_store_overwrites_existing_key() {
    let store = SqliteStateStore::in_memory().unwrap();
    let mut state = sample_state();
    store.save_state("external", &state).unwrap();

    state.collected_files.push("/home/site/tmp/y.php".to_string());
    state.complete();
    store.save_state("external", &state).unwrap();

    let loaded = store.load_state("external").unwrap();
    assert!(loaded.is_complete());
    assert_eq!(loaded.collected_files.len(), 2);
}

#[test]
fn test_keys_are_independent() {
    let store = MemoryStateStore::new();
    store.save_state("scan_a", &sample_state()).unwrap();

    assert_eq!(store.load_state("scan_b").unwrap().phase, Phase::NotStarted);
    assert_eq!(store.load_state("scan_a").unwrap().phase, Phase::Discovery);
}

#[test]
fn test_invalid_keys_rejected() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStateStore::new(temp.path()).unwrap();

    assert!(matches!(
        store.save_state("../escape", &sample_state()),
        Err(StoreError::InvalidKey(_))
    ));
    assert!(matches!(store.load_state(""), Err(StoreError::InvalidKey(_))));
}

#[test]
fn test_json_store_rejects_future_version() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStateStore::new(temp.path()).unwrap();
    let mut state = sample_state();
    state.schema_version = 42;
    std::fs::write(
        temp.path().join("external.json"),
        serde_json::to_string(&state).unwrap(),
    )
    .unwrap();

    assert!(matches!(
        store.load_state("external"),
        Err(StoreError::VersionMismatch { found: 42, .. })
    ));
}

#[test]
fn test_json_store_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let store = JsonFileStateStore::new(temp.path()).unwrap();
    store.save_state("external", &sample_state()).unwrap();

    assert!(temp.path().join("external.json").exists());
    assert!(!temp.path().join("external.tmp").exists());
}

#[test]
fn test_sqlite_store_shared_across_threads() {
    let store = Arc::new(SqliteStateStore::in_memory().unwrap());
    let mut handles = vec![];

    for i in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            let key = format!("scan_{}", i);
            store.save_state(&key, &sample_state()).unwrap();
            store.load_state(&key).unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().unwrap().phase, Phase::Discovery);
    }
}
