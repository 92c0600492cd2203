use std::env;
use std::time::Duration;

/// Default console filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "intake_server=info,tower_http=warn";

/// Default application log file filter when `INTAKE_FILE_LOG_LEVEL` is unset.
/// Debug events can carry caller contact details, so they stay opt-in.
pub const DEFAULT_FILE_LOG_FILTER: &str = "intake_server=info,tower_http=warn";

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Custom log directory path (overrides auto-detection)
    pub custom_log_dir: Option<String>,

    /// Filter for console output (default: `DEFAULT_LOG_FILTER`)
    pub console_log_level: String,

    /// Filter for the application log file (default: `DEFAULT_FILE_LOG_FILTER`)
    pub file_log_level: String,

    /// Write access.log and application.log (default: true)
    pub files_enabled: bool,

    /// Slow request threshold in milliseconds (default: 5000)
    pub slow_request_threshold_ms: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            custom_log_dir: None,
            console_log_level: DEFAULT_LOG_FILTER.to_string(),
            file_log_level: DEFAULT_FILE_LOG_FILTER.to_string(),
            files_enabled: true,
            slow_request_threshold_ms: 5000,
        }
    }
}

impl LogConfig {
    /// Load logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("INTAKE_LOG_DIR").filter(|d| !d.trim().is_empty()) {
            config.custom_log_dir = Some(dir);
        }

        if let Some(filter) = lookup("RUST_LOG").filter(|f| !f.trim().is_empty()) {
            config.console_log_level = filter;
        }

        if let Some(level) = lookup("INTAKE_FILE_LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.file_log_level = level;
        }

        if let Some(val) = lookup("LOG_FILES_ENABLED") {
            config.files_enabled = val.trim().to_lowercase() != "false";
        }

        if let Some(threshold) = lookup("LOG_SLOW_REQUEST_THRESHOLD_MS").and_then(|v| v.parse().ok())
        {
            config.slow_request_threshold_ms = threshold;
        }

        config
    }

    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }
}
