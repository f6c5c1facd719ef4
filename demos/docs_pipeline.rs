//! Runs the full documentation pipeline from a config file.
//!
//! ```text
//! cargo run --example docs_pipeline -- pipeline.yaml [synonyms.yaml]
//! ```
//!
//! Scrapes the configured URLs, writes the raw and grouped JSON artifacts,
//! applies the configured enrichment stages, and prints a per-stage summary
//! plus the first chunk so the `[Section: …]` banner is easy to eyeball.

use std::env;
use std::time::Instant;

use docsmith::{Pipeline, PipelineConfig, PipelineError, SynonymTable};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    init_tracing();

    let mut args = env::args().skip(1);
    let config_path = args
        .next()
        .unwrap_or_else(|| "pipeline.yaml".to_string());
    let config = PipelineConfig::from_file(&config_path)?;

    let synonyms = match args.next() {
        Some(path) => SynonymTable::from_file(&path)?,
        None => SynonymTable::default(),
    };
    println!(
        "Loaded config from {} ({} urls, {} synonym terms)",
        config_path,
        config.urls.len(),
        synonyms.len()
    );

    let start = Instant::now();
    let pipeline = Pipeline::new(config, synonyms)?;
    let outcome = pipeline.run().await?;

    println!(
        "Scraped {} elements into {} entries and {} chunks in {:.2}s",
        outcome.raw_elements.len(),
        outcome.grouped_entries.len(),
        outcome.chunks.len(),
        start.elapsed().as_secs_f64()
    );
    println!(
        "Artifacts: {} and {}",
        pipeline.config().output_raw_file.display(),
        pipeline.config().output_rag_grouping_file.display()
    );

    if let Some(chunk) = outcome.chunks.first() {
        println!("\nFirst chunk [{}]:", chunk.metadata.section_path);
        println!("{}", chunk.page_content);
    }

    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_env_filter("info").finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
