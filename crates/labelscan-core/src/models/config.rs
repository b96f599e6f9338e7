//! Configuration structures for the label scanning service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable holding the Cloud Vision API key.
pub const VISION_API_KEY_ENV: &str = "LABELSCAN_VISION_API_KEY";

/// Environment variable holding the Sheets OAuth access token.
pub const SHEETS_TOKEN_ENV: &str = "LABELSCAN_SHEETS_TOKEN";

/// Environment variable holding the path of a service-account key file.
pub const SHEETS_CREDENTIALS_ENV: &str = "LABELSCAN_SHEETS_CREDENTIALS";

/// Main configuration for labelscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelScanConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Recognition engine configuration.
    pub ocr: OcrConfig,

    /// Tabular store configuration.
    pub table: TableConfig,

    /// Record store configuration.
    pub records: RecordConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_address: String,

    /// Port to listen on.
    pub port: u16,

    /// Origins allowed to call the API. Empty allows any origin.
    pub allowed_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Which recognition engine to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// Google Cloud Vision text detection.
    Vision,
    /// Local ONNX models.
    Local,
}

/// Recognition engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub backend: OcrBackend,

    /// Cloud Vision `images:annotate` endpoint.
    pub vision_endpoint: String,

    /// Cloud Vision API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_api_key: Option<String>,

    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` tokens in locally recognized text.
    pub keep_unk: bool,

    /// Timeout for outbound HTTP calls.
    pub request_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::Vision,
            vision_endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            vision_api_key: None,
            model_dir: PathBuf::from("models"),
            keep_unk: false,
            request_timeout_secs: 30,
        }
    }
}

/// Tabular store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableConfig {
    /// Append rows to a Google Sheets spreadsheet.
    Sheets(SheetsConfig),
    /// Append rows to a local CSV file.
    Csv { path: PathBuf },
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig::Csv {
            path: PathBuf::from("scans.csv"),
        }
    }
}

/// Google Sheets append target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,

    /// A1 range the rows are appended after.
    pub range: String,

    /// Service-account JSON key file. Tokens minted from it are refreshed
    /// before they expire. Takes precedence over `access_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,

    /// Pre-minted OAuth access token with the spreadsheets scope. Not refreshed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Sheets API base URL.
    pub endpoint: String,

    pub request_timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: "Sheet1!A1".to_string(),
            credentials_path: None,
            access_token: None,
            endpoint: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    pub enabled: bool,

    /// JSON lines file receiving one record per save.
    pub path: PathBuf,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("records.jsonl"),
        }
    }
}

impl LabelScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from `path` when given, otherwise use defaults. Env overrides apply either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Fill secrets from the environment. `lookup` is injectable for tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(VISION_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.ocr.vision_api_key = Some(key);
        }
        if let TableConfig::Sheets(sheets) = &mut self.table {
            if let Some(token) = lookup(SHEETS_TOKEN_ENV).filter(|v| !v.is_empty()) {
                sheets.access_token = Some(token);
            }
            if let Some(path) = lookup(SHEETS_CREDENTIALS_ENV).filter(|v| !v.is_empty()) {
                sheets.credentials_path = Some(PathBuf::from(path));
            }
        }
    }
}
