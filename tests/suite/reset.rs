//! Cache reset, missing index stores and buffer-cache sweeping.

use std::rc::Rc;

use serde_json::json;

use indexlink_core::CACHES_RESET_MESSAGE;
use indexlink_types::BufferId;

use crate::common::{
    FILE, FakeHost, FixedClock, IndexStore, ScriptedIndexer, check_style, indexed_project,
    session,
};

const BUF: BufferId = BufferId::new(1);

fn one_error() -> String {
    check_style(
        FILE,
        json!([{"type": "error", "line": 1, "column": 1, "message": "e"}]),
    )
}

#[test]
fn reset_on_a_fresh_session() {
    let clock = FixedClock::at(200);
    let mut session = session(ScriptedIndexer::new(), &clock);
    let mut host = FakeHost::default();

    session.reset_caches(&mut host);

    assert_eq!(host.messages, [CACHES_RESET_MESSAGE]);
    assert!(session.projects().is_empty());
    assert!(session.projects().data_dir().is_none());
    assert_eq!(session.cached_buffers(), 0);
}

#[test]
fn reset_removes_signs_and_forgets_projects() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", one_error());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a"]);

    session.on_poll(&mut host, BUF);
    assert_eq!(host.signs.len(), 1);
    assert_eq!(session.projects().len(), 1);
    assert_eq!(session.projects().data_dir(), Some(store.data_dir()));

    session.reset_caches(&mut host);

    assert!(host.signs.is_empty());
    assert!(session.projects().is_empty());
    assert!(session.projects().data_dir().is_none());
    assert_eq!(session.cached_buffers(), 0);
    assert!(!session.sign_styles().is_defined());

    // The next access resolves everything again.
    session.indexer().clear_calls();
    session.on_poll(&mut host, BUF);
    assert_eq!(session.indexer().calls_to("--project").len(), 1);
    assert_eq!(session.indexer().calls_to("--status info").len(), 1);
    assert_eq!(host.signs.len(), 1);
}

#[test]
fn missing_index_store_resets_everything() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", one_error());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a"]);

    session.on_poll(&mut host, BUF);
    assert_eq!(host.signs.len(), 1);

    store.remove("/src/proj/");
    session.on_poll(&mut host, BUF);

    assert!(host.signs.is_empty());
    assert_eq!(session.cached_buffers(), 0);
    assert!(session.projects().is_empty());
    assert_eq!(host.last_message(), Some(CACHES_RESET_MESSAGE));
}

#[test]
fn one_project_shared_by_its_files() {
    let store = IndexStore::new("/src/proj/", 100);
    let clock = FixedClock::at(200);
    let mut session = session(indexed_project(&store), &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a"]);
    host.add_buffer(BufferId::new(2), "/src/proj/b.cpp", &["b"]);

    let first = session.buffer(&host, BUF).project().cloned().unwrap();
    let second = session
        .buffer(&host, BufferId::new(2))
        .project()
        .cloned()
        .unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.store_path(), store.store_path("/src/proj/"));
    assert_eq!(session.indexer().calls_to("--status info").len(), 1);
}

#[test]
fn invalid_buffers_are_swept_periodically() {
    let store = IndexStore::new("/src/proj/", 100);
    let clock = FixedClock::at(200);
    let mut session = session(indexed_project(&store), &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a"]);
    host.add_buffer(BufferId::new(2), "/src/proj/b.cpp", &["b"]);
    host.add_buffer(BufferId::new(3), "/src/proj/c.cpp", &["c"]);
    host.add_buffer(BufferId::new(4), "/src/proj/d.cpp", &["d"]);

    session.buffer(&host, BUF);
    session.buffer(&host, BufferId::new(2));
    host.buffer_mut(BUF).valid = false;

    // Within the clean period nothing is evicted.
    clock.set(210);
    session.buffer(&host, BufferId::new(3));
    assert_eq!(session.cached_buffers(), 3);

    clock.set(300);
    session.buffer(&host, BufferId::new(4));
    assert_eq!(session.cached_buffers(), 3);
    assert!(session.buffer_state(BUF).is_none());
}

#[test]
fn find_buffer_by_name() {
    let store = IndexStore::new("/src/proj/", 100);
    let clock = FixedClock::at(200);
    let mut session = session(indexed_project(&store), &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a"]);
    host.add_buffer(BufferId::new(2), "/src/proj/b.cpp", &["b"]);

    let found = session.find_buffer(&host, "/src/proj/b.cpp").map(|s| s.id());
    assert_eq!(found, Some(BufferId::new(2)));
    assert!(session.find_buffer(&host, "/elsewhere.cpp").is_none());
}
