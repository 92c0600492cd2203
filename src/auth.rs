use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::IntakeError;
use crate::utils::header_utils::extract_api_key;

/// Keys accepted on the webhook route. Empty means auth is off.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    /// No keys configured: every request is let through
    pub fn empty() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Load API keys from a file, one per line; blank lines and `#` comments are skipped
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut keys = HashSet::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            keys.insert(trimmed.to_string());
        }

        Ok(Self { keys })
    }

    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn validate(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn count(&self) -> usize {
        self.keys.len()
    }
}

/// Try to load API keys from `WEBHOOK_API_KEY_FILE`, then the default locations
pub fn load_api_keys() -> ApiKeys {
    if let Ok(key_file_path) = std::env::var("WEBHOOK_API_KEY_FILE") {
        match ApiKeys::from_file(&key_file_path) {
            Ok(keys) if keys.count() > 0 => {
                tracing::info!("Loaded {} API key(s) from {}", keys.count(), key_file_path);
                return keys;
            }
            Ok(_) => tracing::warn!("API key file is empty: {}", key_file_path),
            Err(e) => tracing::warn!("Could not read API key file '{}': {}", key_file_path, e),
        }
    }

    let mut default_locations = vec![PathBuf::from("./api_keys.txt")];
    if let Some(home) = dirs::home_dir() {
        default_locations.push(home.join(".intake-server/api_keys.txt"));
    }

    for location in default_locations {
        if !location.exists() {
            continue;
        }

        match ApiKeys::from_file(&location) {
            Ok(keys) if keys.count() > 0 => {
                tracing::info!(
                    "Loaded {} API key(s) from {}",
                    keys.count(),
                    location.display()
                );
                return keys;
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Could not read key file {:?}: {}", location, e),
        }
    }

    tracing::info!("No API key file found, webhook authentication disabled");
    ApiKeys::empty()
}

/// Rejects requests without a configured key when auth is enabled
pub async fn auth_middleware(
    State(keys): State<ApiKeys>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !keys.is_enabled() {
        return next.run(request).await;
    }

    match extract_api_key(&headers) {
        Some(key) if keys.validate(&key) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            IntakeError::InvalidApiKey.into_response()
        }
        None => IntakeError::Unauthorized.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_keys() {
        let keys = ApiKeys::empty();
        assert!(!keys.is_enabled());
        assert_eq!(keys.count(), 0);
        assert!(!keys.validate("any-key"));
    }

    #[test]
    fn test_validate_key() {
        let keys = ApiKeys::from_keys(["valid-key-1", "valid-key-2"]);

        assert!(keys.is_enabled());
        assert_eq!(keys.count(), 2);
        assert!(keys.validate("valid-key-1"));
        assert!(keys.validate("valid-key-2"));
        assert!(!keys.validate("invalid-key"));
    }

    #[test]
    fn test_api_keys_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key-1").unwrap();
        writeln!(temp_file, "# comment line").unwrap();
        writeln!(temp_file).unwrap();
        writeln!(temp_file, "key-2").unwrap();
        temp_file.flush().unwrap();

        let keys = ApiKeys::from_file(temp_file.path()).unwrap();

        assert_eq!(keys.count(), 2);
        assert!(keys.validate("key-1"));
        assert!(keys.validate("key-2"));
        assert!(!keys.validate("# comment line"));
    }

    #[test]
    fn test_api_keys_from_file_not_found() {
        let result = ApiKeys::from_file("/nonexistent/path/to/file.txt");
        assert!(result.is_err());
    }

    #[test]
    fn test_api_keys_from_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let keys = ApiKeys::from_file(temp_file.path()).unwrap();

        assert_eq!(keys.count(), 0);
        assert!(!keys.is_enabled());
    }

    #[test]
    fn test_api_keys_trim_whitespace() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "  key-with-spaces  ").unwrap();
        writeln!(temp_file, "\tkey-with-tabs\t").unwrap();
        temp_file.flush().unwrap();

        let keys = ApiKeys::from_file(temp_file.path()).unwrap();

        assert_eq!(keys.count(), 2);
        assert!(keys.validate("key-with-spaces"));
        assert!(keys.validate("key-with-tabs"));
        assert!(!keys.validate("  key-with-spaces  "));
    }

    #[test]
    fn test_api_keys_case_sensitive() {
        let keys = ApiKeys::from_keys(["CaseSensitiveKey"]);

        assert!(keys.validate("CaseSensitiveKey"));
        assert!(!keys.validate("casesensitivekey"));
    }
}
