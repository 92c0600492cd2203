/// Number of cells in every appended row
pub const ROW_WIDTH: usize = 10;

/// Port used when neither `--port` nor `PORT` is given
pub const DEFAULT_PORT: u16 = 3000;

/// Request timeout used when `REQUEST_TIMEOUT_SECONDS` is unset or invalid
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Structured-output names tried first when a webhook carries several outputs
pub const DEFAULT_PREFERRED_OUTPUT_NAMES: &[&str] = &["lead_intake", "intake"];

/// A1 range the rows are appended to (ten columns, A through J)
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A:J";

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for service-account assertions (Google's maximum)
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Access tokens closer than this to expiry are refreshed before use
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range_spans_row_width() {
        // A..J is ten columns
        let last_column = DEFAULT_SHEET_RANGE.chars().last().unwrap();
        assert_eq!((last_column as u8 - b'A' + 1) as usize, ROW_WIDTH);
    }

    #[test]
    fn test_refresh_margin_shorter_than_lifetime() {
        assert!(TOKEN_REFRESH_MARGIN_SECS > 0);
        assert!(TOKEN_REFRESH_MARGIN_SECS < TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn test_preferred_output_names_not_empty() {
        assert!(!DEFAULT_PREFERRED_OUTPUT_NAMES.is_empty());
    }
}
