//! Project membership and index-store liveness.
//!
//! The indexer keeps one on-disk store per project under a shared data
//! directory. The newest modification time inside a project's store is the
//! signal that the index changed and diagnostics may be stale.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::client::Indexer;
use crate::protocol::{self, Query};

#[derive(Debug, thiserror::Error)]
#[error("index store {} is unavailable: {source}", path.display())]
pub struct IndexStoreError {
    path: PathBuf,
    source: io::Error,
}

impl IndexStoreError {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Store directory name for a project root: path separators become `_`.
#[must_use]
pub fn sanitize_root(root: &str) -> String {
    root.replace('/', "_")
}

/// An indexed codebase root.
#[derive(Debug, PartialEq, Eq)]
pub struct Project {
    root: String,
    store_path: PathBuf,
}

impl Project {
    #[must_use]
    pub fn new(root: impl Into<String>, data_dir: &Path) -> Self {
        let root = root.into();
        let store_path = data_dir.join(sanitize_root(&root));
        tracing::debug!(root = %root, store = %store_path.display(), "Project store path");
        Self { root, store_path }
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Newest modification time among the store's entries.
    ///
    /// Recomputed on every call. An empty store reports the epoch. A missing
    /// or unreadable store is an error; callers treat it as an external
    /// rebuild and reset their caches.
    pub fn last_updated_time(&self) -> Result<SystemTime, IndexStoreError> {
        let wrap = |source| IndexStoreError {
            path: self.store_path.clone(),
            source,
        };

        let mut latest = UNIX_EPOCH;
        for entry in fs::read_dir(&self.store_path).map_err(wrap)? {
            let modified = entry
                .and_then(|entry| entry.metadata())
                .and_then(|meta| meta.modified())
                .map_err(wrap)?;
            latest = latest.max(modified);
        }
        Ok(latest)
    }
}

/// Process-wide cache of projects keyed by root, plus the lazily-resolved
/// index store base directory.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    data_dir: Option<PathBuf>,
    projects: HashMap<String, Rc<Project>>,
}

impl ProjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project owning `path`, resolving and caching it on first sight.
    ///
    /// Blank paths, indexer failures and "no project" answers all yield
    /// `None` without creating a cache entry.
    pub fn get<I: Indexer + ?Sized>(&mut self, indexer: &I, path: &str) -> Option<Rc<Project>> {
        if path.trim().is_empty() {
            return None;
        }

        let output = match indexer.query(&Query::Project { path }, None) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Project lookup failed for {path}: {e}");
                return None;
            }
        };
        let Some(root) = protocol::parse_project_root(&output) else {
            tracing::debug!("No indexer project found for {path}");
            return None;
        };

        let data_dir = self.resolve_data_dir(indexer)?;

        if let Some(project) = self.projects.get(root) {
            return Some(Rc::clone(project));
        }

        tracing::info!("Found indexer project {root} for {path}");
        let project = Rc::new(Project::new(root, &data_dir));
        self.projects.insert(root.to_string(), Rc::clone(&project));
        Some(project)
    }

    /// Forget every project and the store base directory.
    pub fn reset(&mut self) {
        self.data_dir = None;
        self.projects.clear();
    }

    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    fn resolve_data_dir<I: Indexer + ?Sized>(&mut self, indexer: &I) -> Option<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Some(dir.clone());
        }

        let info = match indexer.query(&Query::StatusInfo, None) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Failed to query indexer status: {e}");
                return None;
            }
        };
        tracing::debug!("Indexer info:\n{info}");

        let Some(dir) = protocol::parse_data_dir(&info) else {
            tracing::warn!("Indexer status has no dataDir line");
            return None;
        };
        tracing::info!("Indexer data directory set to {}", dir.display());
        self.data_dir = Some(dir.clone());
        Some(dir)
    }
}
