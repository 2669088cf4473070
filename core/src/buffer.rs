//! Per-buffer lifecycle: dirty tracking, reindexing, diagnostics and signs.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::SystemTime;

use indexlink_indexer::protocol::{jobs_mention, parse_fixits};
use indexlink_indexer::{CheckStyleResponse, Indexer, Project, Query};
use indexlink_types::{BufferId, Diagnostic, ListAction, Sign, SignId};

use crate::diagnostics::{
    DIAGNOSTICS_LIST_TITLE, from_indexer_errors, index_by_line, to_list_projection,
};
use crate::fixits::{FIXITS_LIST_TITLE, apply_fixits};
use crate::host::Host;
use crate::policy::{self, Action, BufferSnapshot, IndexState, Trigger};
use crate::settings::EngineSettings;
use crate::signs::{SignPlacer, SignStyles};

pub const NO_ERRORS_MESSAGE: &str = "No errors to display";
pub const REINDEXING_MESSAGE: &str =
    "File is currently reindexing, so fixits are unsafe, please try again shortly";
pub const NO_FIXITS_MESSAGE: &str = "No fixits to apply to this file";
pub const FIXITS_APPLIED_MESSAGE: &str = "Fixits applied";

/// Message for user-invoked actions on a buffer outside every project.
#[must_use]
pub fn no_project_message(name: &str) -> String {
    if name.is_empty() {
        "Please select a file buffer and try again".to_string()
    } else {
        format!("No indexlink project for file: {name}")
    }
}

/// Whether an operation left the caches usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub(crate) enum Flow {
    Continue,
    /// An index store vanished; the session must reset every cache.
    ResetCaches,
}

/// Everything a buffer operation may touch besides the buffer itself.
pub(crate) struct Context<'a, I: ?Sized, H: ?Sized> {
    pub(crate) indexer: &'a I,
    pub(crate) host: &'a mut H,
    pub(crate) styles: &'a mut SignStyles,
    pub(crate) settings: &'a EngineSettings,
    pub(crate) now: SystemTime,
}

impl<I: Indexer + ?Sized, H: Host + ?Sized> Context<'_, I, H> {
    /// Report a failure, pointing the user at the log file.
    pub(crate) fn error(&mut self, msg: &str) {
        tracing::error!("{msg}");
        let text = self.settings.error_message(msg);
        self.host.message(&text);
    }
}

/// Cached engine state for one editor buffer.
#[derive(Debug)]
pub struct BufferState {
    id: BufferId,
    name: String,
    project: Option<Rc<Project>>,
    dirty: bool,
    last_diagnostics: SystemTime,
    diagnostics: BTreeMap<u32, Diagnostic>,
    signs: SignPlacer,
    /// Cursor line seen by the last cursor check; `None` forces a reprint.
    last_cursor_line: Option<u32>,
    line_message_shown: bool,
}

impl BufferState {
    #[must_use]
    pub fn new(
        id: BufferId,
        name: impl Into<String>,
        project: Option<Rc<Project>>,
        sign_start_id: SignId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            project,
            dirty: false,
            last_diagnostics: SystemTime::UNIX_EPOCH,
            diagnostics: BTreeMap::new(),
            signs: SignPlacer::new(id, sign_start_id),
            last_cursor_line: None,
            line_message_shown: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn project(&self) -> Option<&Rc<Project>> {
        self.project.as_ref()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn last_diagnostics_time(&self) -> SystemTime {
        self.last_diagnostics
    }

    /// Diagnostics keyed by 1-indexed line.
    #[must_use]
    pub fn diagnostics(&self) -> &BTreeMap<u32, Diagnostic> {
        &self.diagnostics
    }

    #[must_use]
    pub fn signs(&self) -> &[Sign] {
        self.signs.signs()
    }

    /// Run the lifecycle policy for `trigger` and carry out its decision.
    pub(crate) fn handle<I, H>(&mut self, trigger: Trigger, cx: &mut Context<'_, I, H>) -> Flow
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        let has_project = self.project.is_some();
        let consults_host = matches!(trigger, Trigger::Idle | Trigger::Poll);
        let snapshot = BufferSnapshot {
            has_project,
            really_dirty: has_project && consults_host && self.is_really_dirty(&*cx.host),
            last_diagnostics: self.last_diagnostics,
        };
        let project = self.project.clone();
        let action = policy::decide(trigger, &snapshot, || index_state(project.as_deref()));

        match action {
            Action::Nothing => {}
            Action::ClearDirty => self.dirty = false,
            Action::MarkDirty => self.dirty = true,
            Action::Reindex => {
                tracing::debug!("Buffer {} needs dirty reindex", self.id);
                self.last_diagnostics = cx.now;
                self.dirty_reindex(cx);
            }
            Action::FetchDiagnostics => {
                tracing::debug!(
                    ?trigger,
                    "Project updated, checking for updated diagnostics for {}",
                    self.name
                );
                self.update_diagnostics(cx, false);
            }
            Action::ResetCaches => return Flow::ResetCaches,
        }
        Flow::Continue
    }

    /// Echo the diagnostic on the cursor line when the line changed.
    pub(crate) fn on_cursor_moved<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.project.is_none() {
            return;
        }
        let line = host.cursor_line(host.current_window());
        if self.last_cursor_line == Some(line) {
            return;
        }
        self.last_cursor_line = Some(line);
        if let Some(diagnostic) = self.diagnostics.get(&line) {
            host.echo(diagnostic.message());
            self.line_message_shown = true;
        } else if self.line_message_shown {
            // Only clear a message we printed ourselves.
            host.echo("");
            self.line_message_shown = false;
        }
    }

    /// Refresh diagnostics and force the list widget open.
    pub(crate) fn show_diagnostics_list<I, H>(&mut self, cx: &mut Context<'_, I, H>)
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        if self.project.is_none() {
            cx.host.echo(&no_project_message(&self.name));
            return;
        }
        if self.update_diagnostics(cx, true) && self.diagnostics.is_empty() {
            cx.host.message(NO_ERRORS_MESSAGE);
        }
    }

    pub(crate) fn apply_fixits<I, H>(&mut self, cx: &mut Context<'_, I, H>) -> Flow
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        let Some(project) = self.project.clone() else {
            cx.host.echo(&no_project_message(&self.name));
            return Flow::Continue;
        };

        let reindexing = self.is_reindexing(cx);
        let stale = if !reindexing && cx.settings.auto_diagnostics {
            match index_state(Some(&*project)) {
                IndexState::UpdatedAt(updated) => self.last_diagnostics < updated,
                IndexState::Missing => return Flow::ResetCaches,
            }
        } else {
            false
        };
        if !policy::fixits_safe(reindexing, cx.settings.auto_diagnostics, stale) {
            cx.host.message(REINDEXING_MESSAGE);
            return Flow::Continue;
        }

        let output = match cx.indexer.query(&Query::Fixits { path: &self.name }, None) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Fixits query for {} failed: {e}", self.name);
                cx.error("Failed to fetch fixits");
                return Flow::Continue;
            }
        };
        let output = output.trim();
        if output.is_empty() {
            cx.host.message(NO_FIXITS_MESSAGE);
            return Flow::Continue;
        }
        tracing::debug!("Fixits found:\n{output}");

        let fixits = parse_fixits(output);
        let items = apply_fixits(&mut *cx.host, self.id, &self.name, &fixits);
        let height = items.len().min(cx.settings.max_list_height);
        let window = cx.host.current_window();
        cx.host
            .set_location_list(window, &items, FIXITS_LIST_TITLE, ListAction::Create);
        cx.host.open_location_list(height);
        cx.host.message(FIXITS_APPLIED_MESSAGE);
        Flow::Continue
    }

    /// Remove every sign this buffer placed.
    pub(crate) fn reset_signs<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.signs.clear_all(host);
    }

    /// The dirty flag ANDed with the host's modified flag. The result is
    /// written back, so a spurious edit event corrects itself here.
    fn is_really_dirty<H: Host + ?Sized>(&mut self, host: &H) -> bool {
        self.dirty = self.dirty && host.is_modified(self.id);
        self.dirty
    }

    /// Send the in-memory content to the indexer. The dirty flag is cleared
    /// whether or not the indexer accepted it; a failed reindex is not
    /// retried.
    fn dirty_reindex<I, H>(&mut self, cx: &mut Context<'_, I, H>)
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        let content = cx.host.buffer_lines(self.id).join("\n");
        let query = Query::Reindex {
            path: &self.name,
            unsaved_len: content.len(),
        };
        let result = cx.indexer.query(&query, Some(&content));
        self.dirty = false;
        match result {
            Ok(output) => tracing::debug!("Indexer responded to reindex request: {output}"),
            Err(e) => tracing::warn!("Reindex of {} failed: {e}", self.name),
        }
    }

    /// Whether the indexer has this file queued. A failed status query is
    /// reported and counts as "not reindexing".
    fn is_reindexing<I, H>(&self, cx: &mut Context<'_, I, H>) -> bool
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        match cx.indexer.query(&Query::StatusJobs, None) {
            Ok(jobs) => jobs_mention(&jobs, &self.name),
            Err(e) => {
                tracing::warn!("Job status query failed: {e}");
                cx.error(&format!("Failed to check if {} needs reindex", self.name));
                false
            }
        }
    }

    /// Fetch diagnostics for this file and rebuild the list, signs and
    /// cursor message from them. On failure the previous state is kept.
    /// Returns whether the fetch succeeded.
    fn update_diagnostics<I, H>(&mut self, cx: &mut Context<'_, I, H>, force: bool) -> bool
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        self.last_diagnostics = cx.now;

        let fetched = cx
            .indexer
            .query(&Query::Diagnose { path: &self.name }, None)
            .and_then(|content| Ok(CheckStyleResponse::parse(&content)?));
        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Diagnostics query for {} failed: {e}", self.name);
                cx.error(&format!("Failed to get diagnostics for \"{}\"", self.name));
                return false;
            }
        };
        let errors = response.errors_for(&self.name);
        tracing::debug!("Got {} diagnostics for {}", errors.len(), self.name);

        self.diagnostics = index_by_line(from_indexer_errors(&self.name, errors));
        self.update_location_list(cx, force);
        self.signs
            .replace_all(&mut *cx.host, &mut *cx.styles, self.diagnostics.values());

        self.last_cursor_line = None;
        if cx.host.current_buffer() == self.id {
            self.on_cursor_moved(&mut *cx.host);
        }
        true
    }

    /// Push diagnostics into the current window's location list, but only if
    /// that window shows this buffer and either our list is on top or the
    /// update is forced.
    fn update_location_list<I, H>(&self, cx: &mut Context<'_, I, H>, force: bool)
    where
        I: Indexer + ?Sized,
        H: Host + ?Sized,
    {
        let window = cx.host.current_window();
        if cx.host.window_buffer(window) != self.id {
            return;
        }
        let title = cx.host.location_list_title(window);
        let ours = title.as_deref() == Some(DIAGNOSTICS_LIST_TITLE);
        if !force && !ours {
            tracing::debug!(?title, "Location list not ours, leaving it alone");
            return;
        }

        tracing::debug!("Updating location list with {} diagnostics", self.diagnostics.len());
        let projection = to_list_projection(self.diagnostics.values(), cx.settings.max_list_height);
        let action = if ours {
            ListAction::Replace
        } else {
            ListAction::Create
        };
        cx.host
            .set_location_list(window, projection.items(), DIAGNOSTICS_LIST_TITLE, action);
        if force && !projection.is_empty() {
            cx.host.open_location_list(projection.height());
        }
    }
}

/// Freshness of `project`'s index store; a store that can't be read counts
/// as missing.
fn index_state(project: Option<&Project>) -> IndexState {
    let Some(project) = project else {
        return IndexState::Missing;
    };
    match project.last_updated_time() {
        Ok(updated) => IndexState::UpdatedAt(updated),
        Err(e) => {
            tracing::warn!("Index store for {} is unavailable: {e}", project.root());
            IndexState::Missing
        }
    }
}
