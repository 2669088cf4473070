//! Completion candidates handed to the host's completion menu.

use serde::Serialize;

/// Single-character completion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionKind {
    #[serde(rename = "f")]
    Function,
    #[serde(rename = "m")]
    Method,
    #[serde(rename = "v")]
    Variable,
    #[serde(rename = "d")]
    Macro,
    #[serde(rename = "e")]
    Enum,
    #[serde(rename = "t")]
    Type,
    #[serde(rename = "")]
    Unclassified,
}

impl CompletionKind {
    #[must_use]
    pub const fn letter(self) -> &'static str {
        match self {
            Self::Function => "f",
            Self::Method => "m",
            Self::Variable => "v",
            Self::Macro => "d",
            Self::Enum => "e",
            Self::Type => "t",
            Self::Unclassified => "",
        }
    }
}

/// `{word, kind, menu}` as consumed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    word: String,
    kind: CompletionKind,
    menu: String,
}

impl CompletionItem {
    #[must_use]
    pub fn new(word: impl Into<String>, kind: CompletionKind, menu: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            kind,
            menu: menu.into(),
        }
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn kind(&self) -> CompletionKind {
        self.kind
    }

    #[must_use]
    pub fn menu(&self) -> &str {
        &self.menu
    }
}
