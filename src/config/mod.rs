pub mod constants;
pub mod sheets;

use std::env;
use std::time::Duration;

use constants::{DEFAULT_PORT, DEFAULT_PREFERRED_OUTPUT_NAMES, DEFAULT_REQUEST_TIMEOUT_SECS};

pub use sheets::{ServiceAccountCredentials, SheetsConfig, ValueInputOption};

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (default: 3000)
    pub port: u16,

    /// Per-request timeout, including the sheet append (default: 60s)
    pub request_timeout: Duration,

    /// Structured-output names preferred when selecting the intake result
    pub preferred_output_names: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            preferred_output_names: DEFAULT_PREFERRED_OUTPUT_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ServerConfig {
    /// Load server configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load server configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT").and_then(|v| v.trim().parse().ok()) {
            config.port = port;
        }

        // Invalid or negative values keep the default
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECONDS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(names) = lookup("STRUCTURED_OUTPUT_NAME") {
            let names: Vec<String> = names
                .split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect();
            if !names.is_empty() {
                config.preferred_output_names = names;
            }
        }

        config
    }
}
