//! Editor-side engine for an external code indexer.
//!
//! The engine tracks open buffers, asks the indexer to reindex unsaved
//! content, and renders its diagnostics, fixits and completions into a
//! [`Host`] editor. All state lives in a [`Session`].

mod buffer;
mod clock;
pub mod completion;
pub mod diagnostics;
mod fixits;
mod host;
pub mod policy;
mod session;
mod settings;
pub mod signs;

pub use buffer::{
    BufferState, FIXITS_APPLIED_MESSAGE, NO_ERRORS_MESSAGE, NO_FIXITS_MESSAGE, REINDEXING_MESSAGE,
    no_project_message,
};
pub use clock::{Clock, SystemClock};
pub use completion::identifier_start;
pub use diagnostics::{
    ALL_DIAGNOSTICS_LIST_TITLE, DIAGNOSTICS_LIST_TITLE, ListProjection, from_indexer_errors,
    to_list_projection,
};
pub use fixits::{FIXITS_LIST_TITLE, apply_fixits};
pub use host::Host;
pub use session::{CACHES_RESET_MESSAGE, Session};
pub use settings::EngineSettings;
pub use signs::{SignPlacer, SignStyles, parse_placed_sign_ids};
