//! Batch download example
//!
//! Demonstrates the core flow of product-img-dl:
//! - Loading input records (and optionally a config) from JSON files
//! - Subscribing to job events
//! - Running the job with Ctrl+C cancellation
//!
//! ```bash
//! cargo run --example batch_download -- inputs.json [config.json]
//! ```
//!
//! `inputs.json` holds an array of `{"url": "...", "prefix": "..."}` records.

use product_img_dl::{
    BatchDownloadJob, Config, Event, EventSink, InputRecord, Severity, cancel_on_signal,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(inputs_path) = args.next() else {
        eprintln!("usage: batch_download <inputs.json> [config.json]");
        std::process::exit(2);
    };

    let inputs: Vec<InputRecord> = serde_json::from_str(&std::fs::read_to_string(inputs_path)?)?;
    let config: Config = match args.next() {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Config::default(),
    };

    // Print events as they arrive
    let sink = Arc::new(EventSink::default());
    let mut events = sink.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Progress { percent } => println!("[{percent:>3}%]"),
                Event::Log { message, severity } => match severity {
                    Severity::Error => eprintln!("✗ {message}"),
                    Severity::Success => println!("✓ {message}"),
                    Severity::Command => println!("> {message}"),
                    Severity::Normal => println!("  {message}"),
                },
            }
        }
    });

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let mut job = BatchDownloadJob::from_config(config, sink.clone(), sink.clone())?;
    let result = job.run(&inputs, &cancel).await;

    // Closing the channel ends the printer
    drop(job);
    drop(sink);
    printer.await?;

    let report = result?;
    println!(
        "Saved {} of {} images in {}s",
        report.downloaded.len(),
        report.total,
        (report.finished_at - report.started_at).num_seconds()
    );
    Ok(())
}
