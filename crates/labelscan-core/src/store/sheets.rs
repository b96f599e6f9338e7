//! Google Sheets `values:append` client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, StoreError};
use crate::models::config::SheetsConfig;

use super::google_auth::{ServiceAccountTokens, StaticToken, TokenSource, SHEETS_SCOPE};
use super::TabularStore;

/// Appends rows to a fixed spreadsheet range.
pub struct SheetsStore {
    client: reqwest::Client,
    endpoint: String,
    spreadsheet_id: String,
    range: String,
    tokens: Arc<dyn TokenSource>,
}

#[derive(Serialize)]
struct ValueRange<'a> {
    values: [&'a [String; 7]; 1],
}

impl SheetsStore {
    pub fn from_config(config: &SheetsConfig) -> Result<Self, ConfigError> {
        if config.spreadsheet_id.is_empty() {
            return Err(ConfigError::Missing("table.spreadsheet_id".to_string()));
        }
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let tokens: Arc<dyn TokenSource> = match (&config.credentials_path, &config.access_token) {
            (Some(path), _) => Arc::new(ServiceAccountTokens::from_key_file(
                path,
                SHEETS_SCOPE,
                timeout,
            )?),
            (None, Some(token)) => {
                warn!("Using a fixed Sheets access token; it will not be refreshed");
                Arc::new(StaticToken(token.clone()))
            }
            (None, None) => {
                return Err(ConfigError::Missing(
                    "table.credentials_path or table.access_token".to_string(),
                ))
            }
        };

        Self::with_tokens(config, tokens)
    }

    /// Build with an explicit token source.
    pub fn with_tokens(
        config: &SheetsConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            tokens,
        })
    }

    fn append_url(&self) -> String {
        format!(
            "{}/{}/values/{}:append",
            self.endpoint, self.spreadsheet_id, self.range
        )
    }
}

#[async_trait]
impl TabularStore for SheetsStore {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn append_row(&self, row: &[String; 7]) -> Result<(), StoreError> {
        let token = self.tokens.access_token().await?;
        let url = self.append_url();
        debug!("Appending row to {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&token)
            .json(&ValueRange { values: [row] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Sheets(format!("HTTP {}: {}", status, body)));
        }

        info!("Appended row to spreadsheet {}", self.spreadsheet_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: "sheet-1".to_string(),
            access_token: Some("token".to_string()),
            endpoint: "https://sheets.example.com/v4/spreadsheets/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_url() {
        let store = SheetsStore::from_config(&config()).unwrap();
        assert_eq!(
            store.append_url(),
            "https://sheets.example.com/v4/spreadsheets/sheet-1/values/Sheet1!A1:append"
        );
    }

    #[test]
    fn test_missing_spreadsheet_id() {
        let config = SheetsConfig {
            spreadsheet_id: String::new(),
            ..config()
        };
        assert!(matches!(
            SheetsStore::from_config(&config),
            Err(ConfigError::Missing(ref key)) if key == "table.spreadsheet_id"
        ));
    }

    #[test]
    fn test_needs_credentials_or_token() {
        let config = SheetsConfig {
            access_token: None,
            ..config()
        };
        assert!(matches!(
            SheetsStore::from_config(&config),
            Err(ConfigError::Missing(ref key)) if key.contains("credentials_path")
        ));
    }

    #[test]
    fn test_credentials_file_takes_precedence() {
        let config = SheetsConfig {
            credentials_path: Some("/nonexistent/key.json".into()),
            ..config()
        };
        assert!(matches!(
            SheetsStore::from_config(&config),
            Err(ConfigError::Io { ref path, .. }) if path == "/nonexistent/key.json"
        ));
    }

    #[tokio::test]
    async fn test_token_failure_is_reported_before_sending() {
        struct NoToken;

        #[async_trait]
        impl TokenSource for NoToken {
            async fn access_token(&self) -> Result<String, StoreError> {
                Err(StoreError::Auth("HTTP 400: invalid_grant".to_string()))
            }
        }

        let store = SheetsStore::with_tokens(&config(), Arc::new(NoToken)).unwrap();
        let row = ["B-204", "A1", "N/A", "N/A", "N/A", "N/A", "N/A"].map(String::from);

        let err = store.append_row(&row).await.unwrap_err();
        assert_eq!(err.to_string(), "authorization failed: HTTP 400: invalid_grant");
    }

    #[test]
    fn test_row_body() {
        let row = [
            "B-204", "ABC123", "Windows 10", "12345", "2 years", "Dec 2025", "N/A",
        ]
        .map(String::from);

        assert_eq!(
            serde_json::to_value(ValueRange { values: [&row] }).unwrap(),
            serde_json::json!({
                "values": [["B-204", "ABC123", "Windows 10", "12345", "2 years", "Dec 2025", "N/A"]]
            })
        );
    }
}
