//! Request-level operations behind the HTTP endpoints.

mod extraction;
mod persistence;

pub use extraction::ExtractionService;
pub use persistence::PersistenceForwarder;

use thiserror::Error;

/// Outcome of a failed scan or save request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The caller sent something unusable. Client error.
    #[error("{0}")]
    Validation(String),

    /// A collaborator failed. Server error.
    #[error("{message}: {detail}")]
    Upstream { message: String, detail: String },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>, detail: impl ToString) -> Self {
        ServiceError::Upstream {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    /// Human-readable message for the response body.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Validation(message) => message,
            ServiceError::Upstream { message, .. } => message,
        }
    }

    /// Underlying error text, for server errors only.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ServiceError::Validation(_) => None,
            ServiceError::Upstream { detail, .. } => Some(detail),
        }
    }
}

#[cfg(test)]
pub(crate) mod doubles {
    //! In-memory stand-ins for the external collaborators.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::{OcrError, StoreError};
    use crate::models::label::StoredRecord;
    use crate::ocr::TextRecognizer;
    use crate::store::{RecordStore, TabularStore};

    pub enum Reply {
        Text(&'static str),
        NoText,
        Fail(&'static str),
    }

    pub struct FakeRecognizer {
        reply: Reply,
        pub calls: AtomicUsize,
        pub last_image: Mutex<Vec<u8>>,
    }

    impl FakeRecognizer {
        pub fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                last_image: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextRecognizer for FakeRecognizer {
        fn name(&self) -> &str {
            "fake"
        }

        async fn recognize(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_image.lock().unwrap() = image.to_vec();
            match self.reply {
                Reply::Text(text) => Ok(Some(text.to_string())),
                Reply::NoText => Ok(None),
                Reply::Fail(message) => Err(OcrError::Request(message.to_string())),
            }
        }
    }

    #[derive(Default)]
    pub struct MemoryTable {
        pub fail: bool,
        pub rows: Mutex<Vec<[String; 7]>>,
    }

    #[async_trait]
    impl TabularStore for MemoryTable {
        fn name(&self) -> &str {
            "memory"
        }

        async fn append_row(&self, row: &[String; 7]) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Sheets("HTTP 503: backend unavailable".to_string()));
            }
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryRecords {
        pub fail: bool,
        pub records: Mutex<Vec<StoredRecord>>,
    }

    #[async_trait]
    impl RecordStore for MemoryRecords {
        fn name(&self) -> &str {
            "memory"
        }

        async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}
