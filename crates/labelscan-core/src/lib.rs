//! Core library for equipment label scanning.
//!
//! This crate provides:
//! - Field extraction from recognized label text (serial number, OS, P/O,
//!   warranty, expiration, leftover text)
//! - Text recognition adapters (Cloud Vision, local ONNX models)
//! - Tabular and record stores for confirmed scans
//! - The extraction service and persistence forwarder behind the HTTP API

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod service;
pub mod store;

pub use error::{ConfigError, LabelScanError, OcrError, Result, StoreError};
pub use extract::{extract_fields, ExtractionResult, FieldKind, LabelParser};
pub use models::config::LabelScanConfig;
pub use models::label::{FieldSet, SaveRequest, ScanRecord, ScanRequest, StoredRecord, NOT_AVAILABLE};
pub use ocr::{create_recognizer, TextRecognizer, VisionRecognizer};
#[cfg(feature = "native")]
pub use ocr::LocalRecognizer;
pub use service::{ExtractionService, PersistenceForwarder, ServiceError};
pub use store::{create_record_store, create_tabular_store, RecordStore, TabularStore};
