//! Buffer lifecycle: dirty tracking, reindexing, throttled diagnostics,
//! cursor messages and the diagnostics list.

use serde_json::json;

use indexlink_core::{DIAGNOSTICS_LIST_TITLE, NO_ERRORS_MESSAGE};
use indexlink_types::{BufferId, ListAction};

use crate::common::{
    FILE, FakeHost, FixedClock, IndexStore, ScriptedIndexer, at, check_style, indexed_project,
    session,
};

const BUF: BufferId = BufferId::new(1);

fn two_errors() -> String {
    check_style(
        FILE,
        json!([
            {"type": "error", "line": 2, "column": 3, "message": "a.cpp:2:3: error: Issue: missing ;"},
            {"type": "warning", "line": 4, "column": 1, "message": "a.cpp:4:1: warning: Issue: unused x"},
            {"type": "skipped", "line": 9, "column": 1},
        ]),
    )
}

fn host() -> FakeHost {
    FakeHost::with_buffer(FILE, &["int main() {", "  int x", "  return 0;", "  int y;", "}"])
}

#[test]
fn idle_ignores_spurious_dirty_flag() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_edit(&mut host, BUF);
    assert!(session.buffer_state(BUF).unwrap().is_dirty());

    // The editor says the buffer is unmodified, so the edit was spurious.
    session.on_idle(&mut host, BUF);
    assert!(!session.buffer_state(BUF).unwrap().is_dirty());
    assert!(session.indexer().calls_to("--reindex").is_empty());
}

#[test]
fn idle_reindexes_really_dirty_buffer() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--reindex", "ok");
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_edit(&mut host, BUF);
    host.buffer_mut(BUF).modified = true;
    session.on_idle(&mut host, BUF);

    let reindex = session.indexer().calls_to("--reindex");
    assert_eq!(reindex.len(), 1);
    let content = "int main() {\n  int x\n  return 0;\n  int y;\n}";
    assert_eq!(reindex[0].stdin.as_deref(), Some(content));
    assert_eq!(
        reindex[0].args.last().unwrap(),
        &format!("{FILE}:{}", content.len())
    );

    let state = session.buffer_state(BUF).unwrap();
    assert!(!state.is_dirty());
    assert_eq!(state.last_diagnostics_time(), at(200));
    // Diagnostics are skipped in the round that reindexed.
    assert!(session.indexer().calls_to("--diagnose").is_empty());
}

#[test]
fn failed_reindex_still_clears_dirty() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.fail("--reindex");
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_edit(&mut host, BUF);
    host.buffer_mut(BUF).modified = true;
    session.on_idle(&mut host, BUF);
    assert!(!session.buffer_state(BUF).unwrap().is_dirty());

    // Not retried on the next tick.
    session.indexer().clear_calls();
    session.on_idle(&mut host, BUF);
    assert!(session.indexer().calls_to("--reindex").is_empty());
}

#[test]
fn poll_never_reindexes() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_edit(&mut host, BUF);
    host.buffer_mut(BUF).modified = true;
    session.on_poll(&mut host, BUF);

    assert!(session.indexer().calls_to("--reindex").is_empty());
    assert!(session.indexer().calls_to("--diagnose").is_empty());
    assert!(session.buffer_state(BUF).unwrap().is_dirty());
}

#[test]
fn write_clears_dirty() {
    let store = IndexStore::new("/src/proj/", 100);
    let clock = FixedClock::at(200);
    let mut session = session(indexed_project(&store), &clock);
    let mut host = host();

    session.on_edit(&mut host, BUF);
    session.on_write(&mut host, BUF);
    assert!(!session.buffer_state(BUF).unwrap().is_dirty());
}

#[test]
fn poll_fetches_diagnostics_once_per_index_update() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_poll(&mut host, BUF);
    let state = session.buffer_state(BUF).unwrap();
    assert_eq!(state.diagnostics().len(), 2);
    assert_eq!(state.diagnostics()[&2].message(), "missing ;");
    assert_eq!(state.diagnostics()[&4].message(), "unused x");
    assert_eq!(session.indexer().calls_to("--diagnose").len(), 1);

    // Index unchanged: throttled.
    session.on_poll(&mut host, BUF);
    session.on_idle(&mut host, BUF);
    assert_eq!(session.indexer().calls_to("--diagnose").len(), 1);

    // Index moved past the last fetch.
    store.touch("/src/proj/", 300);
    clock.set(400);
    session.on_idle(&mut host, BUF);
    assert_eq!(session.indexer().calls_to("--diagnose").len(), 2);
    assert_eq!(session.buffer_state(BUF).unwrap().last_diagnostics_time(), at(400));
}

#[test]
fn duplicate_lines_keep_the_last_record() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond(
        "--diagnose",
        check_style(
            FILE,
            json!([
                {"type": "warning", "line": 3, "column": 1, "message": "first"},
                {"type": "error", "line": 3, "column": 5, "message": "second"},
            ]),
        ),
    );
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_poll(&mut host, BUF);
    let diagnostics = session.buffer_state(BUF).unwrap().diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[&3].message(), "second");
    assert_eq!(host.signs.len(), 1);
}

#[test]
fn failed_fetch_keeps_previous_state() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_poll(&mut host, BUF);
    let signs_before = host.signs.clone();

    session.indexer().fail("--diagnose");
    store.touch("/src/proj/", 300);
    clock.set(400);
    session.on_poll(&mut host, BUF);

    let state = session.buffer_state(BUF).unwrap();
    assert_eq!(state.diagnostics().len(), 2);
    assert_eq!(host.signs, signs_before);
    // The attempt still counts for throttling.
    assert_eq!(state.last_diagnostics_time(), at(400));
    assert_eq!(
        host.last_message(),
        Some(
            "Failed to get diagnostics for \"/src/proj/a.cpp\": see log file at \"/tmp/indexlink.log\" for more information"
        )
    );
}

#[test]
fn malformed_response_is_a_failure() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", "not json");
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_poll(&mut host, BUF);
    assert!(session.buffer_state(BUF).unwrap().diagnostics().is_empty());
    assert!(host.last_message().unwrap().starts_with("Failed to get diagnostics"));
}

#[test]
fn cursor_shows_and_clears_line_diagnostic() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.on_poll(&mut host, BUF);
    // Cursor on line 1 has nothing to show and nothing to clear.
    assert!(host.echoes.is_empty());

    host.cursor = 2;
    session.on_cursor_moved(&mut host, BUF);
    assert_eq!(host.echoes, ["missing ;"]);

    session.on_cursor_moved(&mut host, BUF);
    assert_eq!(host.echoes.len(), 1);

    host.cursor = 3;
    session.on_cursor_moved(&mut host, BUF);
    assert_eq!(host.echoes, ["missing ;", ""]);

    // Nothing of ours is shown, so other messages are left alone.
    host.cursor = 5;
    session.on_cursor_moved(&mut host, BUF);
    assert_eq!(host.echoes.len(), 2);
}

#[test]
fn refetch_reprints_cursor_line() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();
    host.cursor = 2;

    session.on_poll(&mut host, BUF);
    assert_eq!(host.echoes, ["missing ;"]);

    store.touch("/src/proj/", 300);
    clock.set(400);
    session.on_poll(&mut host, BUF);
    assert_eq!(host.echoes, ["missing ;", "missing ;"]);
}

#[test]
fn background_fetch_leaves_foreign_list_alone() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();
    host.location_title = Some("grep results".to_string());

    session.on_poll(&mut host, BUF);
    assert!(host.location_lists.is_empty());
}

#[test]
fn show_list_forces_then_polls_replace() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.show_diagnostics_list(&mut host, BUF);
    assert_eq!(host.location_lists.len(), 1);
    let created = &host.location_lists[0];
    assert_eq!(created.title, DIAGNOSTICS_LIST_TITLE);
    assert_eq!(created.action, ListAction::Create);
    assert_eq!(created.items.len(), 2);
    assert_eq!(host.opened_location, [2]);

    store.touch("/src/proj/", 300);
    clock.set(400);
    session.on_poll(&mut host, BUF);
    assert_eq!(host.location_lists.len(), 2);
    assert_eq!(host.location_lists[1].action, ListAction::Replace);
    // Only a forced update opens the window.
    assert_eq!(host.opened_location, [2]);
}

#[test]
fn show_list_with_no_diagnostics() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", check_style(FILE, json!([])));
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();

    session.show_diagnostics_list(&mut host, BUF);
    assert_eq!(host.location_lists.len(), 1);
    assert!(host.location_lists[0].items.is_empty());
    assert!(host.opened_location.is_empty());
    assert_eq!(host.last_message(), Some(NO_ERRORS_MESSAGE));
}

#[test]
fn list_only_updates_for_the_shown_buffer() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", two_errors());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = host();
    host.window_buffer = BufferId::new(7);

    session.show_diagnostics_list(&mut host, BUF);
    assert!(host.location_lists.is_empty());
    assert_eq!(session.buffer_state(BUF).unwrap().diagnostics().len(), 2);
}

#[test]
fn no_project_buffer_issues_no_queries() {
    let indexer = ScriptedIndexer::new();
    indexer.respond("--project", "No matches for /tmp/scratch.cpp\n");
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = FakeHost::with_buffer("/tmp/scratch.cpp", &["x"]);
    host.buffer_mut(BUF).modified = true;

    assert!(session.buffer(&host, BUF).project().is_none());
    session.indexer().clear_calls();

    session.on_edit(&mut host, BUF);
    session.on_idle(&mut host, BUF);
    session.on_poll(&mut host, BUF);
    session.on_cursor_moved(&mut host, BUF);

    assert!(session.indexer().calls().is_empty());
    let state = session.buffer_state(BUF).unwrap();
    assert!(!state.is_dirty());
    assert!(state.diagnostics().is_empty());
    assert!(host.signs.is_empty());
}

#[test]
fn blank_buffer_name_never_queries() {
    let clock = FixedClock::at(200);
    let mut session = session(ScriptedIndexer::new(), &clock);
    let mut host = FakeHost::with_buffer("", &[]);

    session.on_edit(&mut host, BUF);
    session.on_idle(&mut host, BUF);
    session.show_diagnostics_list(&mut host, BUF);

    assert!(session.indexer().calls().is_empty());
    assert_eq!(host.echoes, ["Please select a file buffer and try again"]);
}

#[test]
fn explicit_actions_name_the_unindexed_file() {
    let clock = FixedClock::at(200);
    let mut session = session(ScriptedIndexer::new(), &clock);
    let mut host = FakeHost::with_buffer("/tmp/scratch.cpp", &["x"]);

    session.apply_fixits(&mut host, BUF);
    assert_eq!(
        host.echoes,
        ["No indexlink project for file: /tmp/scratch.cpp"]
    );
}
