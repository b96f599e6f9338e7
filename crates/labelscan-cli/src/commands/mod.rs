//! Subcommands and shared helpers.

pub mod batch;
pub mod config;
pub mod scan;
pub mod serve;

use std::path::{Path, PathBuf};

use tracing::debug;

use labelscan_core::models::label::{FieldSet, ROW_HEADERS};
use labelscan_core::LabelScanConfig;

/// Output format for scan results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (same shape as the scan endpoint)
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("labelscan")
        .join("config.json")
}

/// Resolve configuration: `--config`, then the default file if present, then defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LabelScanConfig> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => Some(default_config_path()).filter(|p| p.exists()),
    };
    debug!("Loading configuration from {:?}", path);
    Ok(LabelScanConfig::load(path.as_deref())?)
}

pub fn format_fields(
    fields: &FieldSet,
    room: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
        OutputFormat::Csv => format_csv(fields, room),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &FieldSet, room: Option<&str>) -> anyhow::Result<String> {
    let record = labelscan_core::ScanRecord::from_fields(room, fields.clone());
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(ROW_HEADERS)?;
    wtr.write_record(record.to_row())?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(fields: &FieldSet) -> String {
    let mut output = String::new();
    output.push_str(&format!("OS: {}\n", fields.operating_system));
    output.push_str(&format!("Exp: {}\n", fields.expiration_date));
    output.push_str(&format!("P/O: {}\n", fields.purchase_order));
    output.push_str(&format!("Serial No: {}\n", fields.serial_number));
    output.push_str(&format!("Warranty: {}\n", fields.warranty));
    output.push_str(&format!("Other: {}\n", fields.other));
    output
}

/// File extensions treated as label images.
pub fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "webp" | "bmp" | "tiff" | "gif")
}
