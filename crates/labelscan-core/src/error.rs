//! Error types for the labelscan-core library.

use thiserror::Error;

/// Main error type for the labelscan library.
#[derive(Error, Debug)]
pub enum LabelScanError {
    /// Text recognition error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Tabular or record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by a text recognition engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The request to the recognition service could not be completed.
    #[error("recognition request failed: {0}")]
    Request(String),

    /// The recognition service answered with something we cannot use.
    #[error("unexpected recognition response: {0}")]
    Response(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        OcrError::Request(err.to_string())
    }
}

/// Errors raised while writing scan records.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Spreadsheet append failed.
    #[error("spreadsheet append failed: {0}")]
    Sheets(String),

    /// Could not obtain an access token.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// CSV write failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Record serialization failed.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Background task failed.
    #[error("write task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Sheets(err.to_string())
    }
}

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required setting is missing for the selected backend.
    #[error("missing setting: {0}")]
    Missing(String),

    /// A setting has a value that cannot be used.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Result type for the labelscan library.
pub type Result<T> = std::result::Result<T, LabelScanError>;
