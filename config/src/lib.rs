//! Configuration for indexlink.
//!
//! Read from `~/.indexlink/config.toml`. Every section and key is optional;
//! a missing file yields [`IndexlinkConfig::default`].
//!
//! ```toml
//! [indexer]
//! command = "rc"
//!
//! [diagnostics]
//! auto = true
//! use_location_list = true
//! max_list_height = 10
//!
//! [cache]
//! clean_period_secs = 30
//!
//! [signs]
//! start_id = 2000
//!
//! [log]
//! path = "~/.indexlink/logs/indexlink.log"
//! level = "debug"
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_INDEXER_COMMAND: &str = "rc";
const DEFAULT_MAX_LIST_HEIGHT: usize = 10;
const DEFAULT_CLEAN_PERIOD_SECS: u64 = 30;
const DEFAULT_SIGN_START_ID: u32 = 2000;
const DEFAULT_LOG_LEVEL: &str = "debug";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

fn default_command() -> String {
    DEFAULT_INDEXER_COMMAND.to_string()
}

const fn default_max_list_height() -> usize {
    DEFAULT_MAX_LIST_HEIGHT
}

const fn default_clean_period_secs() -> u64 {
    DEFAULT_CLEAN_PERIOD_SECS
}

const fn default_start_id() -> u32 {
    DEFAULT_SIGN_START_ID
}

fn default_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexlinkConfig {
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub signs: SignsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// External indexer invocation.
#[derive(Debug, Deserialize)]
pub struct IndexerConfig {
    /// Indexer client executable. `~` and `${VAR}` are expanded.
    #[serde(default = "default_command")]
    pub command: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
        }
    }
}

impl IndexerConfig {
    /// The command with `~` and environment variables expanded.
    #[must_use]
    pub fn command_path(&self) -> PathBuf {
        expand_path(&self.command)
    }
}

#[derive(Debug, Deserialize)]
pub struct DiagnosticsConfig {
    /// Refresh diagnostics automatically on idle/poll.
    #[serde(default = "default_true")]
    pub auto: bool,
    /// Show all-files diagnostics in the location list instead of quickfix.
    #[serde(default = "default_true")]
    pub use_location_list: bool,
    /// Upper bound for list window height.
    #[serde(default = "default_max_list_height")]
    pub max_list_height: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            auto: true,
            use_location_list: true,
            max_list_height: DEFAULT_MAX_LIST_HEIGHT,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Minimum interval between sweeps of closed buffers.
    #[serde(default = "default_clean_period_secs")]
    pub clean_period_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            clean_period_secs: DEFAULT_CLEAN_PERIOD_SECS,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn clean_period(&self) -> Duration {
        Duration::from_secs(self.clean_period_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct SignsConfig {
    #[serde(default = "default_start_id")]
    pub start_id: u32,
}

impl Default for SignsConfig {
    fn default() -> Self {
        Self {
            start_id: DEFAULT_SIGN_START_ID,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Log file. Defaults to `logs/indexlink.log` next to the config file.
    pub path: Option<String>,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: default_level(),
        }
    }
}

impl LogConfig {
    /// Resolved log file path, if one can be determined.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(raw) => Some(expand_path(raw)),
            None => config_dir().map(|dir| dir.join("logs").join("indexlink.log")),
        }
    }
}

/// Expand `${VAR}` references. Missing variables expand to the empty string;
/// an unclosed `${` is kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Expand environment variables, then a leading `~`.
#[must_use]
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = expand_env_vars(raw);
    if expanded == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

impl IndexlinkConfig {
    /// Load from the default location. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(&content)
            .map(Some)
            .map_err(|err| {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                }
            })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".indexlink"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}
