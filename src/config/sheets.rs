use serde::Deserialize;
use std::env;
use std::fmt;

use super::constants::{DEFAULT_SHEETS_API_BASE, DEFAULT_SHEET_RANGE, DEFAULT_TOKEN_URI};
use crate::error::{IntakeError, Result};

/// Google service-account key, as found in the downloaded credentials JSON
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountCredentials {
    pub fn from_json(json: &str) -> Result<Self> {
        let credentials: Self = serde_json::from_str(json)
            .map_err(|e| IntakeError::Credentials(format!("invalid credentials JSON: {}", e)))?;

        if credentials.client_email.trim().is_empty() || credentials.private_key.trim().is_empty() {
            return Err(IntakeError::Credentials(
                "client_email and private_key must not be empty".to_string(),
            ));
        }

        Ok(credentials)
    }
}

// Keep the private key out of logs
impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// How the Sheets API interprets appended values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Parsed as if typed into the UI ("$1,000" becomes a number)
    UserEntered,
    /// Stored verbatim as strings
    Raw,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::UserEntered => "USER_ENTERED",
            ValueInputOption::Raw => "RAW",
        }
    }
}

/// Everything the Google Sheets sink needs, passed in at construction
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// A1 range rows are appended to (default: "Sheet1!A:J")
    pub range: String,
    pub value_input_option: ValueInputOption,
    /// Sheets API base URL (default: https://sheets.googleapis.com)
    pub api_base: String,
    pub credentials: ServiceAccountCredentials,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>, credentials: ServiceAccountCredentials) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: DEFAULT_SHEET_RANGE.to_string(),
            value_input_option: ValueInputOption::UserEntered,
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            credentials,
        }
    }

    /// Load sheet configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load sheet configuration from an arbitrary key lookup
    ///
    /// Credentials come from `GOOGLE_CREDENTIALS` (inline JSON) or, failing
    /// that, the file named by `GOOGLE_CREDENTIALS_FILE`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = load_credentials(&lookup)?;

        let spreadsheet_id = lookup("SPREADSHEET_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| IntakeError::Config("SPREADSHEET_ID is not set".to_string()))?;

        let mut config = Self::new(spreadsheet_id, credentials);

        if let Some(range) = lookup("SHEET_RANGE").filter(|v| !v.trim().is_empty()) {
            config.range = range.trim().to_string();
        }

        if let Some(option) = lookup("SHEET_VALUE_INPUT_OPTION") {
            config.value_input_option = match option.trim().to_uppercase().as_str() {
                "RAW" => ValueInputOption::Raw,
                "USER_ENTERED" | "" => ValueInputOption::UserEntered,
                other => {
                    return Err(IntakeError::Config(format!(
                        "SHEET_VALUE_INPUT_OPTION must be RAW or USER_ENTERED, got '{}'",
                        other
                    )))
                }
            };
        }

        if let Some(base) = lookup("SHEETS_API_BASE").filter(|v| !v.trim().is_empty()) {
            config.api_base = base.trim().trim_end_matches('/').to_string();
        }

        Ok(config)
    }
}

fn load_credentials<F>(lookup: &F) -> Result<ServiceAccountCredentials>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(json) = lookup("GOOGLE_CREDENTIALS").filter(|v| !v.trim().is_empty()) {
        return ServiceAccountCredentials::from_json(&json);
    }

    if let Some(path) = lookup("GOOGLE_CREDENTIALS_FILE").filter(|v| !v.trim().is_empty()) {
        let json = std::fs::read_to_string(path.trim()).map_err(|e| {
            IntakeError::Credentials(format!("could not read '{}': {}", path.trim(), e))
        })?;
        return ServiceAccountCredentials::from_json(&json);
    }

    Err(IntakeError::Credentials(
        "set GOOGLE_CREDENTIALS or GOOGLE_CREDENTIALS_FILE".to_string(),
    ))
}
