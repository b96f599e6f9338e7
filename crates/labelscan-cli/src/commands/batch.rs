//! Batch command - scan every label image matching a pattern.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use labelscan_core::models::label::ROW_HEADERS;
use labelscan_core::{
    create_recognizer, create_record_store, create_tabular_store, ExtractionService,
    PersistenceForwarder, ScanRecord, NOT_AVAILABLE,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input images
    #[arg(required = true)]
    input: String,

    /// Summary CSV path
    #[arg(short, long, default_value = "summary.csv")]
    output: PathBuf,

    /// Room the equipment is in
    #[arg(short, long)]
    room: Option<String>,

    /// Forward each scan with a serial number to the configured stores
    #[arg(long)]
    save: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

struct ScanResult {
    path: PathBuf,
    /// Extracted fields, kept even when saving them failed.
    record: Option<ScanRecord>,
    error: Option<String>,
}

struct BatchOutcome {
    results: Vec<ScanResult>,
    saved: usize,
    /// Set when a failure stopped the run early.
    aborted: Option<String>,
}

/// Scan (and optionally save) each file in order.
///
/// Scan and save failures are recorded per file. Without
/// `continue_on_error` the first failure stops the run, keeping the
/// results gathered so far.
async fn scan_files(
    files: &[PathBuf],
    service: &ExtractionService,
    forwarder: Option<&PersistenceForwarder>,
    room: Option<&str>,
    continue_on_error: bool,
    pb: &ProgressBar,
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        results: Vec::with_capacity(files.len()),
        saved: 0,
        aborted: None,
    };

    for path in files {
        let scanned = match tokio::fs::read(path).await {
            Ok(image) => service
                .scan_bytes(&image, room.unwrap_or(NOT_AVAILABLE))
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let result = match scanned {
            Ok(fields) => {
                let record = ScanRecord::from_fields(room, fields);
                let error = match forwarder {
                    Some(_) if record.fields.serial_number == NOT_AVAILABLE => {
                        warn!("No serial number in {}, not saved", path.display());
                        None
                    }
                    Some(forwarder) => match forwarder.persist(record.clone()).await {
                        Ok(_) => {
                            outcome.saved += 1;
                            None
                        }
                        Err(e) => Some(format!("save failed: {}", e)),
                    },
                    None => None,
                };
                ScanResult {
                    path: path.clone(),
                    record: Some(record),
                    error,
                }
            }
            Err(message) => ScanResult {
                path: path.clone(),
                record: None,
                error: Some(message),
            },
        };

        pb.inc(1);

        let failure = result.error.clone();
        outcome.results.push(result);

        if let Some(message) = failure {
            if !continue_on_error {
                error!("Failed on {}: {}", path.display(), message);
                outcome.aborted = Some(message);
                break;
            }
            warn!("Failed on {}: {}", path.display(), message);
        }
    }

    outcome
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| super::is_image(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} images to scan",
        style("ℹ").blue(),
        files.len()
    );

    let service = ExtractionService::new(create_recognizer(&config.ocr)?);
    let forwarder = if args.save {
        Some(PersistenceForwarder::new(
            create_tabular_store(&config.table)?,
            create_record_store(&config.records),
        ))
    } else {
        None
    };
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")?
            .progress_chars("=>-"),
    );

    let outcome = scan_files(
        &files,
        &service,
        forwarder.as_ref(),
        args.room.as_deref(),
        args.continue_on_error,
        &pb,
    )
    .await;

    pb.finish_with_message("Complete");

    write_summary(&args.output, &outcome.results)?;
    debug!("Wrote summary to {}", args.output.display());

    if let Some(message) = outcome.aborted {
        eprintln!(
            "{} Partial summary written to {}",
            style("!").yellow(),
            args.output.display()
        );
        anyhow::bail!("Scanning failed: {}", message);
    }

    let results = outcome.results;
    let saved = outcome.saved;
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Scanned {} images in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );
    if args.save {
        println!("   {} saved", style(saved).green());
    }
    println!(
        "{} Summary written to {}",
        style("✓").green(),
        args.output.display()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed images:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[ScanResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["File"];
    header.extend(ROW_HEADERS);
    header.push("Error");
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let mut row = vec![filename.to_string()];
        match &result.record {
            Some(record) => {
                row.extend(record.to_row());
                row.push(result.error.clone().unwrap_or_default());
            }
            None => {
                row.extend(std::iter::repeat_n(String::new(), ROW_HEADERS.len()));
                row.push(result.error.clone().unwrap_or_default());
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use async_trait::async_trait;
    use labelscan_core::store::CsvStore;
    use labelscan_core::{OcrError, TextRecognizer};
    use tempfile::tempdir;

    use super::*;

    struct FixedText(&'static str);

    #[async_trait]
    impl TextRecognizer for FixedText {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn recognize(&self, _image: &[u8]) -> Result<Option<String>, OcrError> {
            Ok(Some(self.0.to_string()))
        }
    }

    fn images(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                fs::write(&path, b"img").unwrap();
                path
            })
            .collect()
    }

    fn service(text: &'static str) -> ExtractionService {
        ExtractionService::new(Arc::new(FixedText(text)))
    }

    fn forwarder(table: CsvStore) -> PersistenceForwarder {
        PersistenceForwarder::new(Arc::new(table), None)
    }

    #[tokio::test]
    async fn save_failure_is_recorded_and_run_continues() {
        let dir = tempdir().unwrap();
        let files = images(dir.path(), &["a.png", "b.png"]);
        // A directory cannot be opened as the CSV file.
        let broken = forwarder(CsvStore::new(dir.path()));

        let outcome = scan_files(
            &files,
            &service("Serial: ABC123"),
            Some(&broken),
            Some("B-204"),
            true,
            &ProgressBar::hidden(),
        )
        .await;

        assert!(outcome.aborted.is_none());
        assert_eq!(outcome.saved, 0);
        assert_eq!(outcome.results.len(), 2);
        for result in &outcome.results {
            assert_eq!(
                result.record.as_ref().unwrap().fields.serial_number,
                "ABC123"
            );
            assert!(result.error.as_deref().unwrap().starts_with("save failed: Error saving data"));
        }

        let summary = dir.path().join("summary.csv");
        write_summary(&summary, &outcome.results).unwrap();
        let content = fs::read_to_string(&summary).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("a.png,B-204,ABC123"));
        assert!(content.contains("save failed"));
    }

    #[tokio::test]
    async fn save_failure_stops_run_but_keeps_results() {
        let dir = tempdir().unwrap();
        let files = images(dir.path(), &["a.png", "b.png"]);
        let broken = forwarder(CsvStore::new(dir.path()));

        let outcome = scan_files(
            &files,
            &service("Serial: ABC123"),
            Some(&broken),
            None,
            false,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.aborted.as_deref().unwrap().starts_with("save failed"));
    }

    #[tokio::test]
    async fn saves_only_labels_with_serial() {
        let dir = tempdir().unwrap();
        let files = images(dir.path(), &["a.png"]);
        let table = dir.path().join("scans.csv");

        let with_serial = scan_files(
            &files,
            &service("Serial: ABC123"),
            Some(&forwarder(CsvStore::new(&table))),
            None,
            false,
            &ProgressBar::hidden(),
        )
        .await;
        let without_serial = scan_files(
            &files,
            &service("OS: Windows 10"),
            Some(&forwarder(CsvStore::new(&table))),
            None,
            false,
            &ProgressBar::hidden(),
        )
        .await;

        assert_eq!(with_serial.saved, 1);
        assert_eq!(without_serial.saved, 0);
        assert!(without_serial.results[0].error.is_none());
        assert_eq!(fs::read_to_string(&table).unwrap().lines().count(), 2);
    }
}
