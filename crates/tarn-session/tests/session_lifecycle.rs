//! End-to-end lifecycle tests driving the store the way a request layer
//! would: create a session, persist states across requests, survive
//! promotion, and observe expiry after eviction or deletion.

use tarn_session::{Error, SessionStore, StoreConfig};

fn small_store() -> SessionStore {
    SessionStore::new(StoreConfig::new().with_nb_sessions(2).with_nb_states(2)).unwrap()
}

#[test]
fn request_cycle_create_store_fetch() {
    let store = small_store();
    store.check_concurrence(false, true).unwrap();

    // First request: a new session with its initial state.
    let created = store.create("alice", b"tok-0".to_vec());
    store
        .store(
            "alice",
            created.state_id,
            b"tok-0".to_vec(),
            true,
            None,
            b"v0".to_vec(),
        )
        .unwrap();

    // Second request: resume from the state id in the URL, then snapshot
    // a new state.
    let lock = store.get_lock("alice").unwrap();
    let _held = lock.acquire();

    let resumed = store.fetch("alice", 0).unwrap();
    assert_eq!(resumed.last_state_id, 0);
    assert_eq!(resumed.state_data, b"v0");

    let next_state = resumed.last_state_id + 1;
    store
        .store(
            "alice",
            next_state,
            b"tok-1".to_vec(),
            false,
            Some(b"prefs".to_vec()),
            b"v1".to_vec(),
        )
        .unwrap();

    // Third request: both snapshots are live, metadata is current.
    let latest = store.fetch("alice", next_state).unwrap();
    assert_eq!(latest.last_state_id, 1);
    assert_eq!(latest.secure_token, b"tok-1");
    assert_eq!(latest.session_data, Some(b"prefs".to_vec()));

    let back = store.fetch("alice", 0).unwrap();
    assert_eq!(back.state_data, b"v0");
}

#[test]
fn history_is_bounded_per_session() {
    let store = small_store();
    store.create("alice", vec![]);

    for state_id in 0..4 {
        store
            .store("alice", state_id, vec![], false, None, vec![state_id as u8])
            .unwrap();
    }

    // Only the two newest snapshots survive; the back button on older
    // ones reports expiry.
    assert!(matches!(store.fetch("alice", 0), Err(Error::Expired(_))));
    assert!(matches!(store.fetch("alice", 1), Err(Error::Expired(_))));
    assert_eq!(store.fetch("alice", 2).unwrap().state_data, vec![2]);
    assert_eq!(store.fetch("alice", 3).unwrap().state_data, vec![3]);
}

#[test]
fn cold_sessions_expire_under_pressure() {
    let store = small_store();
    store.create("alice", vec![]);
    store.create("bob", vec![]);

    // Alice stays active while new visitors arrive.
    store
        .store("alice", 0, vec![], false, None, b"busy".to_vec())
        .unwrap();
    store.create("carol", vec![]);

    assert!(store.check_session_id("alice"));
    assert!(!store.check_session_id("bob"));
    assert!(matches!(store.get_lock("bob"), Err(Error::Expired(_))));
    assert!(matches!(
        store.store("bob", 0, vec![], false, None, vec![]),
        Err(Error::Expired(_))
    ));

    // An evicted id can simply be created anew.
    let recreated = store.create("bob", b"fresh".to_vec());
    assert_eq!(recreated.state_id, 0);
    assert!(store.check_session_id("bob"));
}

#[test]
fn explicit_logout_matches_eviction() {
    let store = small_store();
    store.create("alice", vec![]);
    store
        .store("alice", 0, vec![], false, None, vec![])
        .unwrap();

    store.delete("alice").unwrap();

    // Every access path reports the same absence as an eviction would.
    assert!(!store.check_session_id("alice"));
    assert!(matches!(store.get_lock("alice"), Err(Error::Expired(_))));
    assert!(matches!(store.fetch("alice", 0), Err(Error::Expired(_))));
    assert!(matches!(store.delete("alice"), Err(Error::NotFound(_))));
}

#[test]
fn independent_stores_do_not_interfere() {
    let a = small_store();
    let b = small_store();

    a.create("alice", vec![]);
    assert!(a.check_session_id("alice"));
    assert!(!b.check_session_id("alice"));

    b.create("alice", vec![]);
    a.delete("alice").unwrap();
    assert!(b.check_session_id("alice"));
}
