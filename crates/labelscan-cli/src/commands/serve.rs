//! Serve command - run the HTTP API.

use clap::Args;
use tracing::info;

use labelscan_core::{
    create_recognizer, create_record_store, create_tabular_store, ExtractionService,
    PersistenceForwarder,
};
use labelscan_server::{start_server, AppState};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let recognizer = create_recognizer(&config.ocr)?;
    let table = create_tabular_store(&config.table)?;
    let records = create_record_store(&config.records);

    info!(
        recognizer = recognizer.name(),
        table = table.name(),
        records = records.as_ref().map(|r| r.name()).unwrap_or("disabled"),
        "Starting label scanner"
    );

    let state = AppState::new(
        ExtractionService::new(recognizer),
        PersistenceForwarder::new(table, records),
    );
    start_server(&config.server, state).await
}
