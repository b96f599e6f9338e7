//! Scan command - extract label fields from a single image.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use labelscan_core::{
    create_recognizer, create_record_store, create_tabular_store, extract_fields,
    ExtractionService, FieldSet, PersistenceForwarder, ScanRecord,
};

use super::OutputFormat;

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input image, or a text file with --from-text
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Treat the input as already-recognized label text
    #[arg(long)]
    from_text: bool,

    /// Room the equipment is in
    #[arg(short, long)]
    room: Option<String>,

    /// Forward the extracted fields to the configured stores
    #[arg(long)]
    save: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Scanning {}", args.input.display());

    let fields = if args.from_text {
        let text = fs::read_to_string(&args.input)?;
        extract_fields(&text)
    } else {
        if !super::is_image(&args.input) {
            anyhow::bail!("Unsupported file format: {}", args.input.display());
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Recognizing text...");

        let image = fs::read(&args.input)?;
        let service = ExtractionService::new(create_recognizer(&config.ocr)?);
        let room = args.room.as_deref().unwrap_or(labelscan_core::NOT_AVAILABLE);
        let result = service.scan_bytes(&image, room).await;

        pb.finish_and_clear();
        result?
    };

    debug!("Found {} of 5 fields", fields.found_count());

    let output = super::format_fields(&fields, args.room.as_deref(), args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save {
        save(&config, args.room.as_deref(), fields).await?;
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

async fn save(
    config: &labelscan_core::LabelScanConfig,
    room: Option<&str>,
    fields: FieldSet,
) -> anyhow::Result<()> {
    if fields.serial_number == labelscan_core::NOT_AVAILABLE {
        anyhow::bail!("No serial number found on the label, nothing saved");
    }

    let forwarder = PersistenceForwarder::new(
        create_tabular_store(&config.table)?,
        create_record_store(&config.records),
    );
    let stored = forwarder
        .persist(ScanRecord::from_fields(room, fields))
        .await?;

    eprintln!(
        "{} Saved {} at {}",
        style("✓").green(),
        stored.record.fields.serial_number,
        stored.timestamp.to_rfc3339()
    );
    Ok(())
}
