//! Client for the external source indexer.
//!
//! Every query is one synchronous subprocess invocation. Responses are
//! decoded here; caching and presentation policy live in `indexlink-core`.

pub mod client;
pub mod completion;
pub mod project;
pub mod protocol;

pub use client::{Indexer, IndexerFailure, NOT_INDEXED_SENTINEL, RcClient};
pub use completion::parse_completions;
pub use project::{IndexStoreError, Project, ProjectRegistry};
pub use protocol::{CheckStyleResponse, ErrorRecord, Query};
