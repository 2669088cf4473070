//! Indexer process handle: one blocking invocation per query.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::string::FromUtf8Error;
use std::thread;

use crate::protocol::Query;

/// Printed by the indexer when the target file is outside every project.
pub const NOT_INDEXED_SENTINEL: &str = "is not indexed";

#[derive(Debug, thiserror::Error)]
pub enum IndexerFailure {
    #[error("failed to spawn {}: {source}", command.display())]
    Spawn {
        command: PathBuf,
        source: io::Error,
    },
    #[error("failed to write indexer stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("failed to collect indexer output: {0}")]
    Wait(#[source] io::Error),
    #[error("indexer exited with code {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("file is not indexed: {0}")]
    NotIndexed(String),
    #[error("indexer output is not valid UTF-8")]
    Decode(#[from] FromUtf8Error),
    #[error("malformed indexer response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Narrow synchronous interface to the indexer.
///
/// Implementations block until the invocation has finished. There is no
/// retry; callers branch on the failure.
pub trait Indexer {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, IndexerFailure>;

    fn query(&self, query: &Query<'_>, stdin: Option<&str>) -> Result<String, IndexerFailure> {
        self.run(&query.args(), stdin)
    }
}

impl<T: Indexer + ?Sized> Indexer for Box<T> {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, IndexerFailure> {
        (**self).run(args, stdin)
    }
}

/// Indexer backed by the indexer's command-line client.
#[derive(Debug, Clone)]
pub struct RcClient {
    command: PathBuf,
}

impl RcClient {
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Resolve `command` through `PATH`. An unresolvable command is kept as
    /// given so the spawn failure surfaces on first use.
    #[must_use]
    pub fn resolve(command: &Path) -> Self {
        match which::which(command) {
            Ok(resolved) => Self::new(resolved),
            Err(e) => {
                tracing::warn!("{} not found in PATH: {e}", command.display());
                Self::new(command)
            }
        }
    }

    #[must_use]
    pub fn command(&self) -> &Path {
        &self.command
    }
}

impl Indexer for RcClient {
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String, IndexerFailure> {
        tracing::debug!(command = %self.command.display(), ?args, "Indexer command");

        let mut child = Command::new(&self.command)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| IndexerFailure::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a chatty child can't fill its
        // stdout pipe while we are still writing.
        let writer = match (stdin, child.stdin.take()) {
            (Some(content), Some(mut pipe)) => {
                let content = content.to_owned();
                Some(thread::spawn(move || pipe.write_all(content.as_bytes())))
            }
            _ => None,
        };

        let output = child.wait_with_output().map_err(IndexerFailure::Wait)?;

        if let Some(writer) = writer {
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            match written {
                Ok(()) => {}
                // The child may legitimately exit without draining stdin.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(IndexerFailure::Stdin(e)),
            }
        }

        classify_output(
            output.status.success(),
            output.status.code(),
            output.stdout,
            &output.stderr,
        )
    }
}

/// Map a finished invocation to its output or a failure.
pub(crate) fn classify_output(
    success: bool,
    code: Option<i32>,
    stdout: Vec<u8>,
    stderr: &[u8],
) -> Result<String, IndexerFailure> {
    if !success {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        tracing::debug!(?code, %stderr, "Indexer command failed");
        return Err(IndexerFailure::Exit { code, stderr });
    }

    let out = String::from_utf8(stdout)?;
    if out.contains(NOT_INDEXED_SENTINEL) {
        tracing::debug!(output = %out.trim(), "Indexer reports file not indexed");
        return Err(IndexerFailure::NotIndexed(out.trim().to_string()));
    }

    Ok(out)
}
