//! Raw indexer records to diagnostics, and diagnostics to list projections.

use std::collections::BTreeMap;

use indexlink_indexer::ErrorRecord;
use indexlink_types::{Diagnostic, DiagnosticKind, ListItem};

/// Leading noise the indexer puts in front of the human-readable message.
pub const ISSUE_MARKER: &str = "Issue: ";

/// Title of the per-buffer diagnostics location list.
pub const DIAGNOSTICS_LIST_TITLE: &str = "indexlink diagnostics";

/// Title of the all-files diagnostics list.
pub const ALL_DIAGNOSTICS_LIST_TITLE: &str = "indexlink diagnostics for all files";

/// Build diagnostics for `path`, dropping `skipped` records.
#[must_use]
pub fn from_indexer_errors(path: &str, errors: &[ErrorRecord]) -> Vec<Diagnostic> {
    errors
        .iter()
        .filter_map(|record| {
            let kind = DiagnosticKind::from_label(&record.kind);
            if kind.is_skipped() {
                return None;
            }
            Some(Diagnostic::new(
                path,
                record.line,
                record.column,
                kind,
                strip_issue_marker(&record.message),
            ))
        })
        .collect()
}

/// Text after the first `Issue: `, or the message unchanged without one.
#[must_use]
pub fn strip_issue_marker(message: &str) -> &str {
    message
        .find(ISSUE_MARKER)
        .map_or(message, |at| &message[at + ISSUE_MARKER.len()..])
}

/// Key diagnostics by line. Later records replace earlier ones on the same
/// line.
#[must_use]
pub fn index_by_line(diagnostics: Vec<Diagnostic>) -> BTreeMap<u32, Diagnostic> {
    diagnostics.into_iter().map(|d| (d.line(), d)).collect()
}

/// Diagnostics rendered for a list widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListProjection {
    height: usize,
    items: Vec<ListItem>,
}

impl ListProjection {
    /// Window height: item count capped at the configured maximum.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sort by kind label, then file, then line, and number items from 1.
#[must_use]
pub fn to_list_projection<'a>(
    diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    max_height: usize,
) -> ListProjection {
    let mut sorted: Vec<&Diagnostic> = diagnostics.into_iter().collect();
    sorted.sort_by(|a, b| {
        (a.kind().label(), a.path(), a.line()).cmp(&(b.kind().label(), b.path(), b.line()))
    });

    let items: Vec<ListItem> = sorted
        .into_iter()
        .enumerate()
        .map(|(index, diagnostic)| diagnostic.to_list_item().with_number(index + 1))
        .collect();

    ListProjection {
        height: items.len().min(max_height),
        items,
    }
}
