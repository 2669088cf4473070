//! What a buffer should do in response to an editor event.
//!
//! [`decide`] is a pure function of the event, a snapshot of the buffer, and
//! (lazily) the index store's freshness. It performs no I/O of its own; the
//! store is only consulted when the outcome depends on it.

use std::time::SystemTime;

/// Editor events that drive the buffer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The buffer was written to disk.
    Write,
    /// The buffer text changed.
    Edit,
    /// The cursor has been idle for a while in the current buffer.
    Idle,
    /// Periodic timer for buffers shown in any window.
    Poll,
}

/// What the buffer should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Nothing,
    ClearDirty,
    MarkDirty,
    /// Send the unsaved content to the indexer.
    Reindex,
    FetchDiagnostics,
    /// The project's index store disappeared; every cache is stale.
    ResetCaches,
}

#[derive(Debug, Clone, Copy)]
pub struct BufferSnapshot {
    pub has_project: bool,
    /// Dirty flag already reconciled with the editor's modified flag.
    pub really_dirty: bool,
    pub last_diagnostics: SystemTime,
}

/// Freshness of a project's index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    UpdatedAt(SystemTime),
    Missing,
}

#[must_use]
pub fn decide(
    trigger: Trigger,
    snapshot: &BufferSnapshot,
    index_state: impl FnOnce() -> IndexState,
) -> Action {
    match trigger {
        Trigger::Write => Action::ClearDirty,
        Trigger::Edit if snapshot.has_project => Action::MarkDirty,
        Trigger::Edit => Action::Nothing,
        Trigger::Idle | Trigger::Poll if !snapshot.has_project => Action::Nothing,
        Trigger::Idle if snapshot.really_dirty => Action::Reindex,
        // Polling never reindexes; a dirty buffer waits for idle.
        Trigger::Poll if snapshot.really_dirty => Action::Nothing,
        Trigger::Idle | Trigger::Poll => match index_state() {
            IndexState::UpdatedAt(updated) if snapshot.last_diagnostics < updated => {
                Action::FetchDiagnostics
            }
            IndexState::UpdatedAt(_) => Action::Nothing,
            IndexState::Missing => Action::ResetCaches,
        },
    }
}

/// Fixits are refused while the file is being reindexed, or when automatic
/// diagnostics are on and the index has moved past the diagnostics shown.
#[must_use]
pub fn fixits_safe(reindexing: bool, auto_diagnostics: bool, diagnostics_stale: bool) -> bool {
    !reindexing && !(auto_diagnostics && diagnostics_stale)
}
