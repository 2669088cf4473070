use std::path::PathBuf;
use std::time::Duration;

use indexlink_config::IndexlinkConfig;
use indexlink_types::{SIGN_START_ID, SignId};

/// Resolved engine behaviour, decoupled from where it was configured.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Diagnostics refresh automatically; gates the fixit freshness guard.
    pub auto_diagnostics: bool,
    /// All-files diagnostics go to the location list rather than quickfix.
    pub use_location_list: bool,
    pub max_list_height: usize,
    pub cache_clean_period: Duration,
    pub sign_start_id: SignId,
    /// Log file named in error messages.
    pub log_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            auto_diagnostics: true,
            use_location_list: true,
            max_list_height: 10,
            cache_clean_period: Duration::from_secs(30),
            sign_start_id: SIGN_START_ID,
            log_path: None,
        }
    }
}

impl From<&IndexlinkConfig> for EngineSettings {
    fn from(config: &IndexlinkConfig) -> Self {
        Self {
            auto_diagnostics: config.diagnostics.auto,
            use_location_list: config.diagnostics.use_location_list,
            max_list_height: config.diagnostics.max_list_height,
            cache_clean_period: config.cache.clean_period(),
            sign_start_id: SignId::new(config.signs.start_id),
            log_path: config.log.file_path(),
        }
    }
}

impl EngineSettings {
    /// `<msg>: see log file at "<path>" for more information`
    #[must_use]
    pub fn error_message(&self, msg: &str) -> String {
        match &self.log_path {
            Some(path) => format!(
                "{msg}: see log file at \"{}\" for more information",
                path.display()
            ),
            None => format!("{msg}: see log file for more information"),
        }
    }
}
