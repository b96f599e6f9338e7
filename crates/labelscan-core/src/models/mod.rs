//! Data models and configuration.

pub mod config;
pub mod label;

pub use config::{LabelScanConfig, OcrBackend, OcrConfig, RecordConfig, ServerConfig, SheetsConfig, TableConfig};
pub use label::{FieldSet, SaveRequest, ScanRecord, ScanRequest, StoredRecord, NOT_AVAILABLE, ROW_HEADERS};
