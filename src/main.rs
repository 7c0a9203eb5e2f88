//! Mirror Press CLI entrypoint.
//!
//! Wires the pipeline together from command-line arguments: a JSON-file
//! record store and filesystem document store rooted at the output
//! directory, the default source registry, and a polite fetcher. Dispatches
//! either a single-URL ingest or a date-based batch run.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

use mirror_press::cli::Cli;
use mirror_press::discover::DiscoveryConfig;
use mirror_press::fetcher::{FetchConfig, Fetcher};
use mirror_press::pipeline::Pipeline;
use mirror_press::scrapers::Registry;
use mirror_press::store::{FsDocumentStore, JsonStore};
use mirror_press::translate::{NullTranslator, RetryTranslate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mirror_press starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.url, ?args.date, "Parsed CLI arguments");

    let fetcher = Fetcher::new(FetchConfig {
        delay_min: Duration::from_secs(args.delay_min),
        delay_max: Duration::from_secs(args.delay_max.max(args.delay_min)),
        ..FetchConfig::default()
    })?;

    let store = JsonStore::new(format!("{}/records.json", args.output_dir));
    let documents = FsDocumentStore::new(&args.output_dir);

    let mut pipeline = Pipeline::new(fetcher, Registry::with_default_sources(), store, documents)
        .with_discovery(DiscoveryConfig {
            max_pages: args.max_pages,
            concurrency: args.concurrency,
        });
    if args.translate {
        // No external backend ships with the CLI yet; the null translator
        // makes the translated variant an explicit no-op with a warning.
        warn!("Translation requested but no backend is configured; English-only records will be produced");
        pipeline =
            pipeline.with_translator(RetryTranslate::new(NullTranslator, 2, Duration::from_secs(1)));
    }

    if let Some(raw) = args.url {
        let url = Url::parse(&raw)?;
        let record = pipeline.run_single(&url).await?;
        info!(
            key = %record.key,
            title = %record.title,
            body_ref = %record.body_ref,
            "Article ingested"
        );
    } else if let Some(date) = args.date {
        let summary = pipeline.run_batch(date).await?;
        for record in &summary.records {
            info!(key = %record.key, title = %record.title, "Ingested");
        }
        for (url, error) in &summary.skipped {
            warn!(%url, %error, "Skipped");
        }
        info!(
            ingested = summary.records.len(),
            skipped = summary.skipped.len(),
            "Batch finished"
        );
    }

    info!(
        elapsed_secs = start_time.elapsed().as_secs(),
        "mirror_press done"
    );
    Ok(())
}
