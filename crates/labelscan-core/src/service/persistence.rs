//! Persistence forwarder: confirmed record in, two independent writes out.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::models::label::{SaveRequest, ScanRecord, StoredRecord};
use crate::store::{RecordStore, TabularStore};

use super::ServiceError;

const NO_SERIAL: &str = "No serial number provided.";
const SAVE_FAILED: &str = "Error saving data";

/// Writes confirmed scans to the tabular store and, when present, the record store.
///
/// The two writes are not transactional: if the row is appended and the
/// record insert then fails, the row stays and the call reports an error.
pub struct PersistenceForwarder {
    table: Arc<dyn TabularStore>,
    records: Option<Arc<dyn RecordStore>>,
}

impl PersistenceForwarder {
    pub fn new(table: Arc<dyn TabularStore>, records: Option<Arc<dyn RecordStore>>) -> Self {
        Self { table, records }
    }

    /// Handle a save request.
    pub async fn save(&self, request: SaveRequest) -> Result<StoredRecord, ServiceError> {
        let has_serial = request
            .serial_number
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_serial {
            warn!("Save rejected: no serial number");
            return Err(ServiceError::validation(NO_SERIAL));
        }

        self.persist(ScanRecord::from_request(&request)).await
    }

    /// Write an already-built record.
    pub async fn persist(&self, record: ScanRecord) -> Result<StoredRecord, ServiceError> {
        let room = record.room_number.as_str();
        let serial = record.fields.serial_number.as_str();
        info!(room, serial, table = self.table.name(), "Saving scan");

        self.table.append_row(&record.to_row()).await.map_err(|e| {
            error!(room, serial, "Tabular append failed: {}", e);
            ServiceError::upstream(SAVE_FAILED, e)
        })?;

        let stored = StoredRecord::new(record.clone(), Utc::now());

        if let Some(records) = &self.records {
            records.insert(&stored).await.map_err(|e| {
                error!(
                    room,
                    serial,
                    "Record insert failed after the row was appended: {}", e
                );
                ServiceError::upstream(SAVE_FAILED, e)
            })?;
        }

        info!(room, serial, "Scan saved");
        Ok(stored)
    }
}
