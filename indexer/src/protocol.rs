//! Indexer query arguments and response payloads.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use indexlink_types::Fixit;

/// Printed by a project lookup for a file outside every project.
pub const NO_PROJECT_PREFIX: &str = "No matches";

/// Marker line in `--status info` output naming the index store base.
const DATA_DIR_KEY: &str = "dataDir: ";

/// One logical indexer query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// Which project owns `path`.
    Project { path: &'a str },
    /// Daemon key/value status, including `dataDir`.
    StatusInfo,
    /// Queued and running indexing jobs.
    StatusJobs,
    /// Synchronous diagnostics for one file.
    Diagnose { path: &'a str },
    /// Synchronous diagnostics for every indexed file.
    DiagnoseAll,
    /// Reindex `path` from `unsaved_len` bytes of content supplied on stdin.
    Reindex { path: &'a str, unsaved_len: usize },
    /// Fixit records for one file, plain text.
    Fixits { path: &'a str },
    /// Completions at `line:col` with unsaved content supplied on stdin.
    Complete {
        path: &'a str,
        line: u32,
        col: u32,
        unsaved_len: usize,
        prefix: &'a str,
    },
}

impl Query<'_> {
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let owned = |raw: &[&str]| raw.iter().map(ToString::to_string).collect::<Vec<_>>();
        match *self {
            Query::Project { path } => owned(&["--project", path]),
            Query::StatusInfo => owned(&["--status", "info"]),
            Query::StatusJobs => owned(&["--status", "jobs"]),
            Query::Diagnose { path } => owned(&[
                "--diagnose",
                path,
                "--synchronous-diagnostics",
                "--json",
            ]),
            Query::DiagnoseAll => owned(&["--diagnose-all", "--synchronous-diagnostics", "--json"]),
            Query::Reindex { path, unsaved_len } => {
                let mut args = owned(&["--json", "--reindex", path, "--unsaved-file"]);
                args.push(format!("{path}:{unsaved_len}"));
                args
            }
            Query::Fixits { path } => owned(&["--fixits", path]),
            Query::Complete {
                path,
                line,
                col,
                unsaved_len,
                prefix,
            } => {
                let mut args = vec![
                    "--synchronous-completions".to_string(),
                    "-l".to_string(),
                    format!("{path}:{line}:{col}"),
                    format!("--unsaved-file={path}:{unsaved_len}"),
                    "--json".to_string(),
                ];
                if !prefix.is_empty() {
                    args.push("--code-complete-prefix".to_string());
                    args.push(prefix.to_string());
                }
                args
            }
        }
    }
}

/// `{"checkStyle": {filePath: [errorRecord...]}}`
#[derive(Debug, Default, Deserialize)]
pub struct CheckStyleResponse {
    #[serde(rename = "checkStyle", default)]
    pub check_style: BTreeMap<String, Vec<ErrorRecord>>,
}

impl CheckStyleResponse {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Records for `path`; empty when the indexer reported nothing for it.
    #[must_use]
    pub fn errors_for(&self, path: &str) -> &[ErrorRecord] {
        self.check_style.get(path).map_or(&[], Vec::as_slice)
    }
}

/// A raw diagnostic record as emitted by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub message: String,
}

/// Extract the index store base directory from `--status info` output.
#[must_use]
pub fn parse_data_dir(status_info: &str) -> Option<PathBuf> {
    status_info
        .lines()
        .find_map(|line| line.strip_prefix(DATA_DIR_KEY))
        .map(str::trim_end)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

/// Project root from a project lookup, or `None` for "no project".
#[must_use]
pub fn parse_project_root(output: &str) -> Option<&str> {
    if output.starts_with(NO_PROJECT_PREFIX) {
        return None;
    }
    let root = output.trim();
    (!root.is_empty()).then_some(root)
}

/// Whether `--status jobs` output mentions `path`.
#[must_use]
pub fn jobs_mention(status_jobs: &str, path: &str) -> bool {
    !path.is_empty() && status_jobs.contains(path)
}

/// Parse newline-delimited fixit records, skipping malformed lines.
#[must_use]
pub fn parse_fixits(output: &str) -> Vec<Fixit> {
    output
        .lines()
        .filter_map(|line| match line.parse::<Fixit>() {
            Ok(fixit) => Some(fixit),
            Err(e) => {
                tracing::debug!("Skipping fixit: {e}");
                None
            }
        })
        .collect()
}
