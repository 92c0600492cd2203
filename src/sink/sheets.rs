use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::token::ServiceAccountTokenProvider;
use super::RowSink;
use crate::config::SheetsConfig;
use crate::error::{IntakeError, Result};
use crate::models::NormalizedRow;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<UpdateSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSummary {
    updated_range: Option<String>,
    updated_rows: Option<u64>,
}

/// Appends rows to a Google Sheet through the Sheets v4 `values.append` API
pub struct GoogleSheetsSink {
    client: reqwest::Client,
    config: SheetsConfig,
    append_url: Url,
    tokens: ServiceAccountTokenProvider,
}

impl GoogleSheetsSink {
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| IntakeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Self::with_client(config, client)
    }

    /// Use a preconfigured HTTP client for both token exchange and appends
    pub fn with_client(config: SheetsConfig, client: reqwest::Client) -> Result<Self> {
        let append_url = build_append_url(&config)?;
        let tokens = ServiceAccountTokenProvider::new(client.clone(), config.credentials.clone());

        Ok(Self {
            client,
            config,
            append_url,
            tokens,
        })
    }

    pub fn append_url(&self) -> &Url {
        &self.append_url
    }
}

/// `{api_base}/v4/spreadsheets/{id}/values/{range}:append?valueInputOption=..`
pub fn build_append_url(config: &SheetsConfig) -> Result<Url> {
    let mut url = Url::parse(&config.api_base)
        .map_err(|e| IntakeError::Config(format!("invalid SHEETS_API_BASE: {}", e)))?;

    let range_segment = format!("{}:append", config.range);
    url.path_segments_mut()
        .map_err(|_| IntakeError::Config("SHEETS_API_BASE cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(&[
            "v4",
            "spreadsheets",
            config.spreadsheet_id.as_str(),
            "values",
            range_segment.as_str(),
        ]);

    url.query_pairs_mut()
        .append_pair("valueInputOption", config.value_input_option.as_str());

    Ok(url)
}

/// Request body holding a single row
pub fn append_body(row: &NormalizedRow) -> serde_json::Value {
    json!({ "values": [row.to_values()] })
}

#[async_trait]
impl RowSink for GoogleSheetsSink {
    async fn append(&self, row: &NormalizedRow) -> Result<()> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(self.append_url.clone())
            .bearer_auth(token)
            .json(&append_body(row))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                spreadsheet = %self.config.spreadsheet_id,
                "Sheets API rejected append"
            );
            return Err(IntakeError::SinkRejected {
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<AppendResponse>().await {
            Ok(AppendResponse {
                updates: Some(updates),
            }) => tracing::info!(
                updated_range = updates.updated_range.as_deref().unwrap_or(""),
                updated_rows = updates.updated_rows.unwrap_or(0),
                "Appended row to sheet"
            ),
            Ok(_) => tracing::info!("Appended row to sheet"),
            // The append already succeeded; an odd body is not worth failing for
            Err(e) => tracing::debug!("Could not read append response: {}", e),
        }

        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "google-sheets ({} {})",
            self.config.spreadsheet_id, self.config.range
        )
    }
}
