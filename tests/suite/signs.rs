//! Gutter sign placement and sign styles.

use serde_json::json;

use indexlink_core::{EngineSettings, Session};
use indexlink_types::{BufferId, SignId};

use crate::common::{
    FILE, FakeHost, FixedClock, IndexStore, check_style, indexed_project, session, settings,
};

const BUF: BufferId = BufferId::new(1);

fn three_lines() -> String {
    check_style(
        FILE,
        json!([
            {"type": "error", "line": 1, "column": 1, "message": "e"},
            {"type": "warning", "line": 2, "column": 1, "message": "w"},
            {"type": "fixit", "line": 3, "column": 1, "message": "f"},
        ]),
    )
}

#[test]
fn allocation_skips_ids_used_by_other_plugins() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", three_lines());
    let clock = FixedClock::at(200);
    let settings = EngineSettings {
        sign_start_id: SignId::new(100),
        ..settings()
    };
    let mut session = Session::with_clock(indexer, settings, Box::new(clock.clone()));
    let mut host = FakeHost::with_buffer(FILE, &["a", "b", "c"]);
    host.foreign_sign_ids = [SignId::new(101), SignId::new(103)].into();

    session.on_poll(&mut host, BUF);

    let ids: Vec<u32> = host.signs.iter().map(|s| s.id().value()).collect();
    assert_eq!(ids, [102, 104, 105]);
    let names: Vec<String> = host.signs.iter().map(|s| s.definition_name()).collect();
    assert_eq!(names, ["indexlink_error", "indexlink_warning", "indexlink_fixit"]);
    assert_eq!(session.buffer_state(BUF).unwrap().signs().len(), 3);
}

#[test]
fn refetch_replaces_every_sign() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", three_lines());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a", "b", "c", "d", "e"]);

    session.on_poll(&mut host, BUF);
    assert_eq!(host.sign_lines(), [1, 2, 3]);

    session.indexer().respond(
        "--diagnose",
        check_style(FILE, json!([{"type": "error", "line": 5, "column": 1, "message": "e"}])),
    );
    store.touch("/src/proj/", 300);
    clock.set(400);
    session.on_poll(&mut host, BUF);

    assert_eq!(host.sign_lines(), [5]);
    assert_eq!(session.buffer_state(BUF).unwrap().signs().len(), 1);
}

#[test]
fn styles_inherit_sign_column_background_once() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", three_lines());
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a", "b", "c"]);
    host.highlight_groups.insert(
        "SignColumn".to_string(),
        "SignColumn     xxx links to LineNr".to_string(),
    );
    host.highlight_groups.insert(
        "LineNr".to_string(),
        "LineNr         xxx ctermfg=239 ctermbg=235 guifg=#4e4e4e guibg=#262626".to_string(),
    );

    session.on_poll(&mut host, BUF);
    assert!(session.sign_styles().is_defined());
    assert_eq!(
        host.defined_highlights,
        [
            (
                "indexlink_fixit".to_string(),
                "guifg=#ff00ff ctermfg=5 guibg=#262626 ctermbg=235".to_string()
            ),
            (
                "indexlink_warning".to_string(),
                "guifg=#fff000 ctermfg=11 guibg=#262626 ctermbg=235".to_string()
            ),
            (
                "indexlink_error".to_string(),
                "guifg=#ff0000 ctermfg=1 guibg=#262626 ctermbg=235".to_string()
            ),
        ]
    );
    let texts: Vec<&str> = host.defined_signs.iter().map(|(_, text, _)| text.as_str()).collect();
    assert_eq!(texts, ["Fx", "W", "E"]);

    store.touch("/src/proj/", 300);
    clock.set(400);
    session.on_poll(&mut host, BUF);
    assert_eq!(host.defined_highlights.len(), 3);
}

#[test]
fn styles_wait_for_the_first_sign() {
    let store = IndexStore::new("/src/proj/", 100);
    let indexer = indexed_project(&store);
    indexer.respond("--diagnose", check_style(FILE, json!([])));
    let clock = FixedClock::at(200);
    let mut session = session(indexer, &clock);
    let mut host = FakeHost::with_buffer(FILE, &["a"]);

    session.on_poll(&mut host, BUF);
    assert!(!session.sign_styles().is_defined());
    assert!(host.defined_signs.is_empty());
}
