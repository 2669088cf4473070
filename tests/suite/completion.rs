//! Completion requests with unsaved content.

use serde_json::json;

use indexlink_core::identifier_start;
use indexlink_types::{BufferId, CompletionItem, CompletionKind};

use crate::common::{FILE, FakeHost, FixedClock, ScriptedIndexer, session};

const BUF: BufferId = BufferId::new(1);

#[test]
fn completes_with_prefix_on_stdin() {
    let indexer = ScriptedIndexer::new();
    indexer.respond(
        "--synchronous-completions",
        json!({
            "completions": [
                {
                    "completion": "push_back",
                    "kind": "CXXMethod",
                    "parent": "vector",
                    "signature": "void push_back(const T &)",
                    "brief_comment": ""
                },
                {"completion": "pos", "kind": "VarDecl", "parent": "", "signature": "pos"}
            ]
        })
        .to_string(),
    );
    let clock = FixedClock::at(200);
    let session = session(indexer, &clock);
    let host = FakeHost::with_buffer(FILE, &["int main() {", "  v.", "}"]);

    let items = session.complete(&host, BUF, 2, 5, "pu").unwrap();
    assert_eq!(
        items,
        [
            CompletionItem::new(
                "push_back",
                CompletionKind::Method,
                "vector -- void push_back(const T &)"
            ),
            CompletionItem::new("pos", CompletionKind::Variable, ""),
        ]
    );

    let call = &session.indexer().calls()[0];
    let content = "int main() {\n  v.pu\n}";
    assert_eq!(call.stdin.as_deref(), Some(content));
    assert!(call.args.contains(&format!("{FILE}:2:5")));
    assert!(call.args.contains(&format!("--unsaved-file={FILE}:{}", content.len())));
    assert_eq!(&call.args[call.args.len() - 2..], ["--code-complete-prefix", "pu"]);
}

#[test]
fn failed_completion_is_none() {
    let clock = FixedClock::at(200);
    let session = session(ScriptedIndexer::new(), &clock);
    let host = FakeHost::with_buffer(FILE, &["x"]);
    assert!(session.complete(&host, BUF, 1, 1, "").is_none());
}

#[test]
fn identifier_start_for_completion_column() {
    assert_eq!(identifier_start("  v.pu", 5), 4);
    assert_eq!(identifier_start("  v.", 3), 4);
}
