//! JSON lines file as the record store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::models::label::StoredRecord;

use super::RecordStore;

/// Appends one JSON object per record.
pub struct JsonlRecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlRecordStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!("Stored record at {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::label::{FieldSet, ScanRecord};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_records_are_appended_as_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlRecordStore::new(dir.path().join("records.jsonl"));
        let timestamp = "2024-05-01T12:00:00Z".parse().unwrap();

        for serial in ["A1", "A2"] {
            let fields = FieldSet {
                serial_number: serial.to_string(),
                ..FieldSet::not_available()
            };
            let record = StoredRecord::new(ScanRecord::from_fields(Some("B-204"), fields), timestamp);
            store.insert(&record).await.unwrap();
        }

        let content = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<StoredRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].record.fields.serial_number, "A2");
        assert_eq!(lines[1].timestamp, timestamp);
    }
}
