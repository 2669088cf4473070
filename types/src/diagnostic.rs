//! Diagnostics reported by the indexer for a single file.

use std::fmt;

use crate::list::{ListItem, ListItemType};

/// Kind of a diagnostic record.
///
/// The indexer reports kinds as free-form strings; the known ones get a
/// variant and anything else is carried verbatim in [`DiagnosticKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Fixit,
    /// Preprocessor-skipped region. Never materialized as a [`Diagnostic`].
    Skipped,
    Other(String),
}

impl DiagnosticKind {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "fixit" => Self::Fixit,
            "skipped" => Self::Skipped,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Fixit => "fixit",
            Self::Skipped => "skipped",
            Self::Other(label) => label,
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single issue at a file/line/column.
///
/// Fields are private; diagnostics are rebuilt wholesale on every fetch and
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    path: String,
    /// 1-indexed line number.
    line: u32,
    /// 1-indexed column.
    col: u32,
    kind: DiagnosticKind,
    message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        line: u32,
        col: u32,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            col,
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 1-indexed line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-indexed column.
    #[must_use]
    pub fn col(&self) -> u32 {
        self.col
    }

    #[must_use]
    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Convert to a list-widget record. Warnings map to `W`, everything else
    /// to `E`; fixit diagnostics get a `[FIXIT]` marker.
    #[must_use]
    pub fn to_list_item(&self) -> ListItem {
        let kind = if self.kind == DiagnosticKind::Warning {
            ListItemType::Warning
        } else {
            ListItemType::Error
        };
        let text = if self.kind == DiagnosticKind::Fixit {
            format!("{} [FIXIT]", self.message)
        } else {
            self.message.clone()
        };
        ListItem::new(self.line, self.col, text, self.path.clone()).with_type(kind)
    }
}
