//! Completion requests against unsaved buffer content.

use indexlink_indexer::{Indexer, Query, parse_completions};
use indexlink_types::CompletionItem;

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the identifier ending at `column` (0-indexed, in chars), walking
/// left over alphanumerics and underscores.
///
/// A column past the end of the line is clamped to the last character.
#[must_use]
pub fn identifier_start(line: &str, column: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return 0;
    }
    let mut start = column.min(chars.len() - 1) + 1;
    while start > 0 && is_identifier_char(chars[start - 1]) {
        start -= 1;
    }
    start
}

/// Buffer content with `prefix` appended to line `line` (1-indexed), as the
/// indexer should see it while the user is still typing.
#[must_use]
pub fn content_with_prefix(lines: &[String], line: u32, prefix: &str) -> String {
    let target = (line as usize).saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(index, text)| {
            if index == target {
                format!("{text}{prefix}")
            } else {
                text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask the indexer for completions at `line:col` of `path`.
///
/// Failures are logged and yield `None`; completion is best-effort.
pub fn request<I: Indexer + ?Sized>(
    indexer: &I,
    path: &str,
    lines: &[String],
    line: u32,
    col: u32,
    prefix: &str,
) -> Option<Vec<CompletionItem>> {
    let content = content_with_prefix(lines, line, prefix);
    let query = Query::Complete {
        path,
        line,
        col,
        unsaved_len: content.len(),
        prefix,
    };
    let output = match indexer.query(&query, Some(&content)) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("Completion request for {path} failed: {e}");
            return None;
        }
    };
    match parse_completions(&output) {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!("Malformed completion response for {path}: {e}");
            None
        }
    }
}
