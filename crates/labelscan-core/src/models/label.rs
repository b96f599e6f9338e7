//! Label scan data models and their JSON wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder reported for any field that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers of the tabular store, in row order.
pub const ROW_HEADERS: [&str; 7] = [
    "Room",
    "Serial Number",
    "OS",
    "P/O",
    "Warranty",
    "Expiration",
    "Other",
];

/// Fields extracted from one equipment label.
///
/// Every field holds either a value or [`NOT_AVAILABLE`], never an empty
/// string. Serialized in the order the scan endpoint returns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    #[serde(rename = "serialNum")]
    pub serial_number: String,

    #[serde(rename = "exp")]
    pub expiration_date: String,

    pub warranty: String,

    #[serde(rename = "po")]
    pub purchase_order: String,

    #[serde(rename = "os")]
    pub operating_system: String,

    /// Recognized text left over once every matched field is removed.
    pub other: String,
}

impl FieldSet {
    /// A field set with every field set to [`NOT_AVAILABLE`].
    pub fn not_available() -> Self {
        Self {
            serial_number: NOT_AVAILABLE.to_string(),
            expiration_date: NOT_AVAILABLE.to_string(),
            warranty: NOT_AVAILABLE.to_string(),
            purchase_order: NOT_AVAILABLE.to_string(),
            operating_system: NOT_AVAILABLE.to_string(),
            other: NOT_AVAILABLE.to_string(),
        }
    }

    /// Number of named fields (excluding `other`) holding a real value.
    pub fn found_count(&self) -> usize {
        [
            &self.serial_number,
            &self.expiration_date,
            &self.warranty,
            &self.purchase_order,
            &self.operating_system,
        ]
        .iter()
        .filter(|v| v.as_str() != NOT_AVAILABLE)
        .count()
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::not_available()
    }
}

/// Replace a missing or empty value with [`NOT_AVAILABLE`].
pub fn or_not_available(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Body of a scan request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Base64 image, optionally with a `data:<mime>;base64,` prefix.
    #[serde(default)]
    pub image_base64: Option<String>,

    #[serde(default)]
    pub room_number: Option<String>,
}

/// Body of a save request. Any field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub po: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub exp: Option<String>,
    #[serde(default)]
    pub other: Option<String>,
}

/// A confirmed scan, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub room_number: String,
    #[serde(flatten)]
    pub fields: FieldSet,
}

impl ScanRecord {
    /// Build a record from a save request, defaulting every missing value.
    pub fn from_request(request: &SaveRequest) -> Self {
        Self {
            room_number: or_not_available(request.room_number.as_deref()),
            fields: FieldSet {
                serial_number: or_not_available(request.serial_number.as_deref()),
                expiration_date: or_not_available(request.exp.as_deref()),
                warranty: or_not_available(request.warranty.as_deref()),
                purchase_order: or_not_available(request.po.as_deref()),
                operating_system: or_not_available(request.os.as_deref()),
                other: or_not_available(request.other.as_deref()),
            },
        }
    }

    /// Build a record from freshly extracted fields.
    pub fn from_fields(room_number: Option<&str>, fields: FieldSet) -> Self {
        Self {
            room_number: or_not_available(room_number),
            fields,
        }
    }

    /// Row written to the tabular store. Column order matches [`ROW_HEADERS`].
    pub fn to_row(&self) -> [String; 7] {
        [
            self.room_number.clone(),
            self.fields.serial_number.clone(),
            self.fields.operating_system.clone(),
            self.fields.purchase_order.clone(),
            self.fields.warranty.clone(),
            self.fields.expiration_date.clone(),
            self.fields.other.clone(),
        ]
    }
}

/// A scan record as written to the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    #[serde(flatten)]
    pub record: ScanRecord,

    /// Assigned when the record is written, never by the client.
    pub timestamp: DateTime<Utc>,
}

impl StoredRecord {
    pub fn new(record: ScanRecord, timestamp: DateTime<Utc>) -> Self {
        Self { record, timestamp }
    }
}
