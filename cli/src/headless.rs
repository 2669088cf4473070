//! A [`Host`] backed by files on disk instead of a live editor.
//!
//! Each opened file becomes a buffer shown in the single window. Lists and
//! messages are printed to stdout as they arrive; signs are tracked so they
//! can be summarised afterwards.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use indexlink_core::Host;
use indexlink_types::{BufferId, ListAction, ListItem, Sign, SignId, WindowId};

const WINDOW: WindowId = WindowId::new(1);

#[derive(Debug)]
struct FileBuffer {
    path: PathBuf,
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
    modified: bool,
    signs: Vec<Sign>,
}

#[derive(Debug, Default)]
pub struct FileHost {
    buffers: Vec<FileBuffer>,
    location_title: Option<String>,
}

impl FileHost {
    /// A host with no buffers, for commands that span every file.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let buffer = FileBuffer {
            path: path.to_path_buf(),
            lines: content.lines().map(str::to_owned).collect(),
            line_ending: if content.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: content.ends_with('\n'),
            modified: false,
            signs: Vec::new(),
        };
        Ok(Self {
            buffers: vec![buffer],
            location_title: None,
        })
    }

    pub fn current_buffer_id(&self) -> BufferId {
        self.window_buffer(WINDOW)
    }

    pub fn is_buffer_modified(&self, buffer: BufferId) -> bool {
        self.get(buffer).is_some_and(|b| b.modified)
    }

    /// Write the buffer back to its file atomically, keeping its line endings
    /// and permissions.
    pub fn save(&mut self, buffer: BufferId) -> Result<PathBuf> {
        let file = self
            .get_mut(buffer)
            .with_context(|| format!("no buffer {buffer}"))?;
        let dir = file
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut content = file.lines.join(file.line_ending);
        if file.trailing_newline {
            content.push_str(file.line_ending);
        }
        let permissions = fs::metadata(&file.path)
            .with_context(|| format!("failed to stat {}", file.path.display()))?
            .permissions();

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        fs::set_permissions(tmp.path(), permissions)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&file.path)
            .with_context(|| format!("failed to replace {}", file.path.display()))?;
        file.modified = false;
        Ok(file.path.clone())
    }

    pub fn print_signs(&self, buffer: BufferId) {
        let Some(file) = self.get(buffer) else {
            return;
        };
        for sign in &file.signs {
            println!(
                "sign {} line={} name={}",
                sign.id(),
                sign.line(),
                sign.definition_name()
            );
        }
    }

    fn index(buffer: BufferId) -> Option<usize> {
        (buffer.value() as usize).checked_sub(1)
    }

    fn get(&self, buffer: BufferId) -> Option<&FileBuffer> {
        Self::index(buffer).and_then(|i| self.buffers.get(i))
    }

    fn get_mut(&mut self, buffer: BufferId) -> Option<&mut FileBuffer> {
        Self::index(buffer).and_then(|i| self.buffers.get_mut(i))
    }

    fn print_list(kind: &str, items: &[ListItem], title: &str) {
        println!("-- {title} ({kind}) --");
        for item in items {
            let letter = item.kind().map(|k| format!(" {}:", k.letter())).unwrap_or_default();
            println!(
                "{}:{}:{}:{letter} {}",
                item.filename(),
                item.lnum(),
                item.col(),
                item.text()
            );
        }
    }
}

impl Host for FileHost {
    fn is_buffer_valid(&self, buffer: BufferId) -> bool {
        self.get(buffer).is_some()
    }

    fn buffer_name(&self, buffer: BufferId) -> String {
        self.get(buffer)
            .map(|b| b.path.display().to_string())
            .unwrap_or_default()
    }

    fn buffer_lines(&self, buffer: BufferId) -> Vec<String> {
        self.get(buffer).map(|b| b.lines.clone()).unwrap_or_default()
    }

    fn buffer_line(&self, buffer: BufferId, index: usize) -> Option<String> {
        self.get(buffer)?.lines.get(index).cloned()
    }

    fn set_buffer_line(&mut self, buffer: BufferId, index: usize, text: String) {
        if let Some(file) = self.get_mut(buffer)
            && let Some(line) = file.lines.get_mut(index)
        {
            *line = text;
            file.modified = true;
        }
    }

    fn is_modified(&self, buffer: BufferId) -> bool {
        self.is_buffer_modified(buffer)
    }

    fn buffers(&self) -> Vec<BufferId> {
        (1..=self.buffers.len() as u32).map(BufferId::new).collect()
    }

    fn current_window(&self) -> WindowId {
        WINDOW
    }

    fn window_buffer(&self, _window: WindowId) -> BufferId {
        if self.buffers.is_empty() {
            BufferId::new(0)
        } else {
            BufferId::new(1)
        }
    }

    fn cursor_line(&self, _window: WindowId) -> u32 {
        1
    }

    fn location_list_title(&self, _window: WindowId) -> Option<String> {
        self.location_title.clone()
    }

    fn set_location_list(
        &mut self,
        _window: WindowId,
        items: &[ListItem],
        title: &str,
        action: ListAction,
    ) {
        tracing::debug!(flag = action.flag(), "Location list {title}");
        self.location_title = Some(title.to_string());
        Self::print_list("location list", items, title);
    }

    fn set_quickfix_list(&mut self, items: &[ListItem], title: &str, action: ListAction) {
        tracing::debug!(flag = action.flag(), "Quickfix list {title}");
        Self::print_list("quickfix list", items, title);
    }

    fn open_location_list(&mut self, _height: usize) {}

    fn open_quickfix_list(&mut self, _height: usize) {}

    fn echo(&mut self, text: &str) {
        if !text.is_empty() {
            println!("{text}");
        }
    }

    fn message(&mut self, text: &str) {
        println!("{text}");
    }

    fn highlight_definition(&self, group: &str) -> String {
        format!("{group}      xxx cleared")
    }

    fn define_highlight(&mut self, group: &str, attributes: &str) {
        tracing::debug!("highlight {group} {attributes}");
    }

    fn define_sign(&mut self, name: &str, text: &str, highlight: &str) {
        tracing::debug!("sign define {name} text={text} texthl={highlight}");
    }

    fn placed_sign_ids(&self, buffer: BufferId) -> HashSet<SignId> {
        self.get(buffer)
            .map(|b| b.signs.iter().map(Sign::id).collect())
            .unwrap_or_default()
    }

    fn place_sign(&mut self, sign: &Sign) {
        if let Some(file) = self.get_mut(sign.buffer()) {
            file.signs.push(sign.clone());
        }
    }

    fn unplace_sign(&mut self, sign: &Sign) {
        if let Some(file) = self.get_mut(sign.buffer()) {
            file.signs.retain(|placed| placed.id() != sign.id());
        }
    }
}
