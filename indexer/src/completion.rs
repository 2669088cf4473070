//! Completion response decoding.
//!
//! `{"completions": [{kind, completion, parent, signature, brief_comment}]}`
//! becomes a list of [`CompletionItem`]s whose menu text joins a kind-specific
//! subset of the descriptive fields.

use serde::Deserialize;

use indexlink_types::{CompletionItem, CompletionKind};

const MENU_SEPARATOR: &str = " -- ";

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    completions: Vec<CompletionRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompletionRecord {
    kind: String,
    completion: String,
    parent: String,
    signature: String,
    brief_comment: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Parent,
    Signature,
    BriefComment,
}

impl CompletionRecord {
    fn field(&self, field: Field) -> &str {
        match field {
            Field::Parent => &self.parent,
            Field::Signature => &self.signature,
            Field::BriefComment => &self.brief_comment,
        }
    }

    fn classify(&self) -> (CompletionKind, &'static [Field]) {
        const PARENT_AND_SIGNATURE: &[Field] = &[Field::Parent, Field::Signature];
        const SIGNATURE: &[Field] = &[Field::Signature];
        const PARENT: &[Field] = &[Field::Parent];
        const NONE: &[Field] = &[];

        match self.kind.as_str() {
            "FunctionDecl" | "FunctionTemplate" => (CompletionKind::Function, PARENT_AND_SIGNATURE),
            "CXXMethod" | "CXXConstructor" => (CompletionKind::Method, PARENT_AND_SIGNATURE),
            "VarDecl" => (CompletionKind::Variable, PARENT_AND_SIGNATURE),
            "macro definition" => (CompletionKind::Macro, SIGNATURE),
            "EnumDecl" => (CompletionKind::Enum, PARENT),
            "TypedefDecl" | "StructDecl" | "EnumConstantDecl" | "ClassDecl" | "FieldDecl" => {
                (CompletionKind::Type, PARENT)
            }
            _ => (CompletionKind::Unclassified, NONE),
        }
    }

    /// Join the chosen fields plus the brief comment, dropping empty values
    /// and values that merely repeat the completion word.
    fn menu(&self, fields: &[Field]) -> String {
        fields
            .iter()
            .copied()
            .chain([Field::BriefComment])
            .map(|field| self.field(field))
            .filter(|value| !value.is_empty() && *value != self.completion)
            .collect::<Vec<_>>()
            .join(MENU_SEPARATOR)
    }

    fn into_item(self) -> CompletionItem {
        let (kind, fields) = self.classify();
        let menu = self.menu(fields);
        CompletionItem::new(self.completion, kind, menu)
    }
}

/// Decode a completion response.
pub fn parse_completions(data: &str) -> Result<Vec<CompletionItem>, serde_json::Error> {
    let response: CompletionResponse = serde_json::from_str(data)?;
    Ok(response
        .completions
        .into_iter()
        .map(CompletionRecord::into_item)
        .collect())
}
