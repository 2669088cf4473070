//! Records shown in the host's quickfix/location list widgets.

use serde::Serialize;

/// Single-letter severity shown in the list widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListItemType {
    #[serde(rename = "W")]
    Warning,
    #[serde(rename = "E")]
    Error,
}

impl ListItemType {
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Warning => 'W',
            Self::Error => 'E',
        }
    }
}

/// How a list widget's contents are updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Push a new list onto the stack.
    Create,
    /// Replace the items of the current list.
    Replace,
}

impl ListAction {
    /// Action flag as understood by Vim-like hosts (`" "` or `"r"`).
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Create => " ",
            Self::Replace => "r",
        }
    }
}

/// One navigable entry: `{lnum, col, text, filename, type, nr}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    lnum: u32,
    col: u32,
    text: String,
    filename: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<ListItemType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nr: Option<usize>,
}

impl ListItem {
    #[must_use]
    pub fn new(lnum: u32, col: u32, text: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            lnum,
            col,
            text: text.into(),
            filename: filename.into(),
            kind: None,
            nr: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, kind: ListItemType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_number(mut self, nr: usize) -> Self {
        self.nr = Some(nr);
        self
    }

    #[must_use]
    pub fn lnum(&self) -> u32 {
        self.lnum
    }

    #[must_use]
    pub fn col(&self) -> u32 {
        self.col
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn kind(&self) -> Option<ListItemType> {
        self.kind
    }

    #[must_use]
    pub fn nr(&self) -> Option<usize> {
        self.nr
    }
}
