//! Gutter signs for diagnostics.
//!
//! Each buffer owns a [`SignPlacer`] that allocates sign ids without
//! colliding with signs other plugins have placed. Sign highlight groups are
//! derived from the host's `SignColumn` background so the markers blend with
//! the user's colour scheme.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use indexlink_types::{BufferId, Diagnostic, DiagnosticKind, Sign, SignId, sign_definition_name};

use crate::host::Host;

/// Highlight group whose background the sign groups inherit.
const SIGN_COLUMN_GROUP: &str = "SignColumn";

/// Bounds `links to` chains so a cyclic definition can't loop forever.
const MAX_LINK_DEPTH: usize = 16;

static SIGN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bid=(\d+)").expect("sign id pattern is valid"));
static LINKS_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"links to (\S+)").expect("link pattern is valid"));
static CTERM_BG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bctermbg=(\S+)").expect("ctermbg pattern is valid"));
static GUI_BG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bguibg=(\S+)").expect("guibg pattern is valid"));

/// (kind, sign text, foreground attributes)
const SIGN_STYLES: [(DiagnosticKind, &str, &str); 3] = [
    (DiagnosticKind::Fixit, "Fx", "guifg=#ff00ff ctermfg=5"),
    (DiagnosticKind::Warning, "W", "guifg=#fff000 ctermfg=11"),
    (DiagnosticKind::Error, "E", "guifg=#ff0000 ctermfg=1"),
];

/// Collect `id=<n>` values from a textual sign listing.
#[must_use]
pub fn parse_placed_sign_ids(listing: &str) -> HashSet<SignId> {
    SIGN_ID
        .captures_iter(listing)
        .filter_map(|caps| caps[1].parse().ok())
        .map(SignId::new)
        .collect()
}

/// Background colours of a highlight group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Background {
    pub gui: Option<String>,
    pub cterm: Option<String>,
}

impl Background {
    /// ` guibg=<g> ctermbg=<c>` for whichever colours are set.
    #[must_use]
    pub fn attributes(&self) -> String {
        let mut attrs = String::new();
        if let Some(gui) = &self.gui {
            attrs.push_str(&format!(" guibg={gui}"));
        }
        if let Some(cterm) = &self.cterm {
            attrs.push_str(&format!(" ctermbg={cterm}"));
        }
        attrs
    }
}

/// Resolve `group`'s background by following `links to` chains.
/// `lookup` returns a group's textual definition.
pub fn resolve_background(group: &str, lookup: impl Fn(&str) -> String) -> Background {
    let mut definition = lookup(group);
    for _ in 0..MAX_LINK_DEPTH {
        let Some(target) = LINKS_TO
            .captures(&definition)
            .map(|caps| caps[1].to_string())
        else {
            break;
        };
        definition = lookup(&target);
    }
    let capture = |pattern: &Regex| {
        pattern
            .captures(&definition)
            .map(|caps| caps[1].to_string())
    };
    Background {
        gui: capture(&GUI_BG),
        cterm: capture(&CTERM_BG),
    }
}

/// Lazily defines the sign highlight groups and sign types in the host.
#[derive(Debug, Default)]
pub struct SignStyles {
    defined: bool,
}

impl SignStyles {
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn ensure_defined<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.defined {
            return;
        }
        let background =
            resolve_background(SIGN_COLUMN_GROUP, |group| host.highlight_definition(group));
        let bg = background.attributes();
        for (kind, text, foreground) in &SIGN_STYLES {
            let name = sign_definition_name(kind);
            host.define_highlight(&name, &format!("{foreground}{bg}"));
            host.define_sign(&name, text, &name);
        }
        tracing::debug!(background = %bg, "Defined sign styles");
        self.defined = true;
    }

    /// Forget the definitions so the next placement re-derives them, e.g.
    /// after a colour scheme change.
    pub fn reset(&mut self) {
        self.defined = false;
    }
}

/// Signs currently placed for one buffer.
#[derive(Debug)]
pub struct SignPlacer {
    buffer: BufferId,
    start_id: SignId,
    signs: Vec<Sign>,
}

impl SignPlacer {
    #[must_use]
    pub fn new(buffer: BufferId, start_id: SignId) -> Self {
        Self {
            buffer,
            start_id,
            signs: Vec::new(),
        }
    }

    #[must_use]
    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    /// The id after the most recently placed one (or after the start id),
    /// skipping any id in `used`.
    #[must_use]
    pub fn next_id(&self, used: &HashSet<SignId>) -> SignId {
        let mut id = self.signs.last().map_or(self.start_id, Sign::id).next();
        while used.contains(&id) {
            id = id.next();
        }
        id
    }

    /// Place a sign for `line`, defining the sign styles on first use.
    pub fn place<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        styles: &mut SignStyles,
        line: u32,
        kind: DiagnosticKind,
        used: &HashSet<SignId>,
    ) -> SignId {
        styles.ensure_defined(host);
        let sign = Sign::new(self.next_id(used), line, kind, self.buffer);
        host.place_sign(&sign);
        let id = sign.id();
        self.signs.push(sign);
        id
    }

    pub fn clear_all<H: Host + ?Sized>(&mut self, host: &mut H) {
        for sign in self.signs.drain(..) {
            host.unplace_sign(&sign);
        }
    }

    /// Replace every sign with one per diagnostic. The host's used ids are
    /// read once per batch.
    pub fn replace_all<'a, H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        styles: &mut SignStyles,
        diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
    ) {
        self.clear_all(host);
        let used = host.placed_sign_ids(self.buffer);
        for diagnostic in diagnostics {
            self.place(host, styles, diagnostic.line(), diagnostic.kind().clone(), &used);
        }
    }
}
