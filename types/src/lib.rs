//! Core domain types for indexlink.
//!
//! This crate contains pure domain types with no IO and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod completion;
mod diagnostic;
mod fixit;
mod ids;
mod list;
mod sign;

pub use completion::{CompletionItem, CompletionKind};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use fixit::{Fixit, ParseFixitError};
pub use ids::{BufferId, SignId, WindowId};
pub use list::{ListAction, ListItem, ListItemType};
pub use sign::{SIGN_START_ID, Sign, sign_definition_name};
