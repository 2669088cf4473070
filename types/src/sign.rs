use crate::diagnostic::DiagnosticKind;
use crate::ids::{BufferId, SignId};

/// Ids at or below this value are never allocated for gutter signs.
pub const SIGN_START_ID: SignId = SignId::new(2000);

/// A gutter marker placed next to a buffer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sign {
    id: SignId,
    line: u32,
    kind: DiagnosticKind,
    buffer: BufferId,
}

impl Sign {
    #[must_use]
    pub fn new(id: SignId, line: u32, kind: DiagnosticKind, buffer: BufferId) -> Self {
        Self {
            id,
            line,
            kind,
            buffer,
        }
    }

    #[must_use]
    pub fn id(&self) -> SignId {
        self.id
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn kind(&self) -> &DiagnosticKind {
        &self.kind
    }

    #[must_use]
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Host-side sign definition name, e.g. `indexlink_error`.
    #[must_use]
    pub fn definition_name(&self) -> String {
        sign_definition_name(&self.kind)
    }
}

#[must_use]
pub fn sign_definition_name(kind: &DiagnosticKind) -> String {
    format!("indexlink_{}", kind.label())
}
