//! Destinations for confirmed scans.
//!
//! A [`TabularStore`] receives one fixed-order row per save; a
//! [`RecordStore`] optionally keeps a timestamped copy of the record.

mod csv_table;
pub mod google_auth;
mod jsonl;
mod sheets;

pub use csv_table::CsvStore;
pub use jsonl::JsonlRecordStore;
pub use sheets::SheetsStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result as LabelScanResult, StoreError};
use crate::models::config::{RecordConfig, TableConfig};
use crate::models::label::StoredRecord;

/// Append-only tabular sink (spreadsheet or CSV).
#[async_trait]
pub trait TabularStore: Send + Sync {
    fn name(&self) -> &str;

    /// Append one row. Columns follow [`crate::models::label::ROW_HEADERS`].
    async fn append_row(&self, row: &[String; 7]) -> Result<(), StoreError>;
}

/// Durable store of timestamped scan records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn name(&self) -> &str;

    async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError>;
}

/// Build the tabular store selected by configuration.
pub fn create_tabular_store(config: &TableConfig) -> LabelScanResult<Arc<dyn TabularStore>> {
    match config {
        TableConfig::Sheets(sheets) => Ok(Arc::new(SheetsStore::from_config(sheets)?)),
        TableConfig::Csv { path } => Ok(Arc::new(CsvStore::new(path))),
    }
}

/// Build the record store, or `None` when disabled.
pub fn create_record_store(config: &RecordConfig) -> Option<Arc<dyn RecordStore>> {
    config
        .enabled
        .then(|| Arc::new(JsonlRecordStore::new(&config.path)) as Arc<dyn RecordStore>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LabelScanError};
    use crate::models::config::SheetsConfig;

    #[test]
    fn test_disabled_record_store() {
        let config = RecordConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(create_record_store(&config).is_none());
    }

    #[test]
    fn test_sheets_store_needs_token() {
        let config = TableConfig::Sheets(SheetsConfig {
            spreadsheet_id: "sheet-1".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            create_tabular_store(&config),
            Err(LabelScanError::Config(ConfigError::Missing(_)))
        ));
    }

    #[test]
    fn test_default_table_is_csv() {
        let store = create_tabular_store(&TableConfig::default()).unwrap();
        assert_eq!(store.name(), "csv");
    }
}
