//! Local CSV file as the tabular store.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;
use crate::models::label::ROW_HEADERS;

use super::TabularStore;

/// Appends rows to a CSV file, writing the header when the file is new.
pub struct CsvStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn append(path: &Path, row: &[String; 7]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_new = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if is_new {
        writer.write_record(ROW_HEADERS)?;
    }
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

#[async_trait]
impl TabularStore for CsvStore {
    fn name(&self) -> &str {
        "csv"
    }

    async fn append_row(&self, row: &[String; 7]) -> Result<(), StoreError> {
        let path = self.path.clone();
        let lock = Arc::clone(&self.lock);
        let row = row.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = lock
                .lock()
                .map_err(|_| StoreError::Task("CSV lock poisoned".to_string()))?;
            append(&path, &row)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))??;

        debug!("Appended row to {}", self.path.display());
        Ok(())
    }
}
