//! The engine's root object.
//!
//! A [`Session`] owns every cache the engine keeps: the project registry,
//! the buffer cache and the sign-style flag. The editor integration creates
//! one at startup and routes every callback through it, passing the host in
//! per call.

use std::collections::HashMap;
use std::time::SystemTime;

use indexlink_indexer::{CheckStyleResponse, Indexer, ProjectRegistry, Query};
use indexlink_types::{BufferId, CompletionItem, Diagnostic, ListAction};

use crate::buffer::{BufferState, Context, Flow, NO_ERRORS_MESSAGE};
use crate::clock::{Clock, SystemClock};
use crate::completion;
use crate::diagnostics::{ALL_DIAGNOSTICS_LIST_TITLE, from_indexer_errors, to_list_projection};
use crate::host::Host;
use crate::policy::Trigger;
use crate::settings::EngineSettings;
use crate::signs::SignStyles;

pub const CACHES_RESET_MESSAGE: &str = "indexlink caches have been reset";

pub struct Session<I> {
    indexer: I,
    settings: EngineSettings,
    clock: Box<dyn Clock>,
    projects: ProjectRegistry,
    buffers: HashMap<BufferId, BufferState>,
    styles: SignStyles,
    last_swept: SystemTime,
}

impl<I: Indexer> Session<I> {
    #[must_use]
    pub fn new(indexer: I, settings: EngineSettings) -> Self {
        Self::with_clock(indexer, settings, Box::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(indexer: I, settings: EngineSettings, clock: Box<dyn Clock>) -> Self {
        let last_swept = clock.now();
        Self {
            indexer,
            settings,
            clock,
            projects: ProjectRegistry::new(),
            buffers: HashMap::new(),
            styles: SignStyles::default(),
            last_swept,
        }
    }

    #[must_use]
    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[must_use]
    pub fn projects(&self) -> &ProjectRegistry {
        &self.projects
    }

    #[must_use]
    pub fn sign_styles(&self) -> &SignStyles {
        &self.styles
    }

    /// Cached state for `buffer`, if it has been touched.
    #[must_use]
    pub fn buffer_state(&self, buffer: BufferId) -> Option<&BufferState> {
        self.buffers.get(&buffer)
    }

    #[must_use]
    pub fn cached_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Cached state for `buffer`, created (and its project resolved) on
    /// first access.
    pub fn buffer<H: Host + ?Sized>(&mut self, host: &H, buffer: BufferId) -> &mut BufferState {
        if !self.buffers.contains_key(&buffer) {
            self.sweep_periodically(host);
        }
        let Self {
            indexer,
            settings,
            projects,
            buffers,
            ..
        } = self;
        buffers.entry(buffer).or_insert_with(|| {
            let name = host.buffer_name(buffer);
            tracing::debug!("Wrapping new buffer: {buffer}");
            let project = projects.get(&*indexer, &name);
            BufferState::new(buffer, name, project, settings.sign_start_id)
        })
    }

    /// Cached state for the host buffer called `name`.
    pub fn find_buffer<H: Host + ?Sized>(&mut self, host: &H, name: &str) -> Option<&mut BufferState> {
        let id = host
            .buffers()
            .into_iter()
            .find(|&id| host.is_buffer_valid(id) && host.buffer_name(id) == name)?;
        Some(self.buffer(host, id))
    }

    pub fn on_write<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, |state, cx| state.handle(Trigger::Write, cx));
    }

    pub fn on_edit<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, |state, cx| state.handle(Trigger::Edit, cx));
    }

    pub fn on_idle<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, |state, cx| state.handle(Trigger::Idle, cx));
    }

    pub fn on_poll<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, |state, cx| state.handle(Trigger::Poll, cx));
    }

    pub fn on_cursor_moved<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, |state, cx| {
            state.on_cursor_moved(&mut *cx.host);
            Flow::Continue
        });
    }

    pub fn show_diagnostics_list<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, |state, cx| {
            state.show_diagnostics_list(cx);
            Flow::Continue
        });
    }

    pub fn apply_fixits<H: Host + ?Sized>(&mut self, host: &mut H, buffer: BufferId) {
        self.dispatch(host, buffer, BufferState::apply_fixits);
    }

    /// Diagnostics for every indexed file, in one list.
    pub fn show_all_diagnostics<H: Host + ?Sized>(&mut self, host: &mut H) {
        let fetched = self
            .indexer
            .query(&Query::DiagnoseAll, None)
            .and_then(|content| Ok(CheckStyleResponse::parse(&content)?));
        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("All-files diagnostics query failed: {e}");
                host.message(&self.settings.error_message("Failed to get diagnostics"));
                return;
            }
        };

        let diagnostics: Vec<Diagnostic> = response
            .check_style
            .iter()
            .flat_map(|(path, errors)| from_indexer_errors(path, errors))
            .collect();
        if diagnostics.is_empty() {
            host.message(NO_ERRORS_MESSAGE);
            return;
        }

        let projection = to_list_projection(&diagnostics, self.settings.max_list_height);
        if self.settings.use_location_list {
            let window = host.current_window();
            host.set_location_list(
                window,
                projection.items(),
                ALL_DIAGNOSTICS_LIST_TITLE,
                ListAction::Create,
            );
            host.open_location_list(projection.height());
        } else {
            host.set_quickfix_list(projection.items(), ALL_DIAGNOSTICS_LIST_TITLE, ListAction::Create);
            host.open_quickfix_list(projection.height());
        }
    }

    /// Completions at `line:col` (1-indexed) with `prefix` typed but not yet
    /// in the buffer.
    pub fn complete<H: Host + ?Sized>(
        &self,
        host: &H,
        buffer: BufferId,
        line: u32,
        col: u32,
        prefix: &str,
    ) -> Option<Vec<CompletionItem>> {
        let name = host.buffer_name(buffer);
        if name.is_empty() {
            return None;
        }
        let lines = host.buffer_lines(buffer);
        completion::request(&self.indexer, &name, &lines, line, col, prefix)
    }

    /// Drop every cache: buffers (after removing their signs), projects and
    /// the index-store base directory.
    pub fn reset_caches<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.sweep(host);
        for state in self.buffers.values_mut() {
            state.reset_signs(host);
        }
        self.buffers.clear();
        self.projects.reset();
        self.styles.reset();
        tracing::warn!("Caches reset");
        host.message(CACHES_RESET_MESSAGE);
    }

    fn dispatch<H, F>(&mut self, host: &mut H, buffer: BufferId, op: F)
    where
        H: Host + ?Sized,
        F: FnOnce(&mut BufferState, &mut Context<'_, I, H>) -> Flow,
    {
        self.buffer(host, buffer);
        let now = self.clock.now();
        let Self {
            indexer,
            settings,
            buffers,
            styles,
            ..
        } = self;
        let Some(state) = buffers.get_mut(&buffer) else {
            return;
        };
        let mut cx = Context {
            indexer: &*indexer,
            host: &mut *host,
            styles,
            settings: &*settings,
            now,
        };
        if op(state, &mut cx) == Flow::ResetCaches {
            self.reset_caches(host);
        }
    }

    fn sweep_periodically<H: Host + ?Sized>(&mut self, host: &H) {
        let elapsed = self
            .clock
            .now()
            .duration_since(self.last_swept)
            .unwrap_or_default();
        if elapsed > self.settings.cache_clean_period {
            self.sweep(host);
        }
    }

    /// Evict buffers the host no longer has open.
    fn sweep<H: Host + ?Sized>(&mut self, host: &H) {
        self.buffers.retain(|&id, _| {
            let valid = host.is_buffer_valid(id);
            if !valid {
                tracing::debug!("Cleaning invalid buffer: {id}");
            }
            valid
        });
        self.last_swept = self.clock.now();
    }
}
