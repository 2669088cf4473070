//! The host editor as seen by the engine.
//!
//! Everything the engine reads from or renders into the editor goes through
//! [`Host`]. Implementations translate these calls into the editor's own
//! scripting API; the engine never talks to the editor any other way.

use std::collections::HashSet;

use indexlink_types::{BufferId, ListAction, ListItem, Sign, SignId, WindowId};

pub trait Host {
    // ── Buffers ──────────────────────────────────────────────────────────

    /// Whether the editor still has this buffer open.
    fn is_buffer_valid(&self, buffer: BufferId) -> bool;

    /// File name of the buffer; empty for pseudo-buffers without a file.
    fn buffer_name(&self, buffer: BufferId) -> String;

    /// Current in-memory content, one entry per line.
    fn buffer_lines(&self, buffer: BufferId) -> Vec<String>;

    /// A single line (0-indexed), or `None` past the end of the buffer.
    fn buffer_line(&self, buffer: BufferId, index: usize) -> Option<String>;

    /// Replace a single line (0-indexed).
    fn set_buffer_line(&mut self, buffer: BufferId, index: usize, text: String);

    /// The editor's authoritative "has unsaved changes" flag.
    fn is_modified(&self, buffer: BufferId) -> bool;

    /// Every buffer the editor knows about.
    fn buffers(&self) -> Vec<BufferId>;

    // ── Windows ──────────────────────────────────────────────────────────

    fn current_window(&self) -> WindowId;

    fn window_buffer(&self, window: WindowId) -> BufferId;

    /// 1-indexed cursor line in `window`.
    fn cursor_line(&self, window: WindowId) -> u32;

    fn current_buffer(&self) -> BufferId {
        self.window_buffer(self.current_window())
    }

    // ── List widgets ─────────────────────────────────────────────────────

    /// Title of the location list currently at the top of `window`'s stack.
    fn location_list_title(&self, window: WindowId) -> Option<String>;

    fn set_location_list(
        &mut self,
        window: WindowId,
        items: &[ListItem],
        title: &str,
        action: ListAction,
    );

    fn set_quickfix_list(&mut self, items: &[ListItem], title: &str, action: ListAction);

    fn open_location_list(&mut self, height: usize);

    fn open_quickfix_list(&mut self, height: usize);

    // ── Messages ─────────────────────────────────────────────────────────

    /// Transient message line. An empty string clears it.
    fn echo(&mut self, text: &str);

    /// Message kept in the editor's message history.
    fn message(&mut self, text: &str);

    // ── Highlights and signs ─────────────────────────────────────────────

    /// Textual definition of a highlight group, e.g.
    /// `SignColumn xxx ctermbg=233 guibg=#121212` or `... links to LineNr`.
    fn highlight_definition(&self, group: &str) -> String;

    fn define_highlight(&mut self, group: &str, attributes: &str);

    fn define_sign(&mut self, name: &str, text: &str, highlight: &str);

    /// Ids of every sign placed in `buffer`, including other plugins' signs.
    fn placed_sign_ids(&self, buffer: BufferId) -> HashSet<SignId>;

    fn place_sign(&mut self, sign: &Sign);

    fn unplace_sign(&mut self, sign: &Sign);
}
