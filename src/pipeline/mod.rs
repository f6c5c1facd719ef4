//! End-to-end pipeline orchestration.
//!
//! [`Pipeline::run`] wires the stages together: scrape the configured URLs,
//! persist the raw record artifact, group the records into h1-rooted
//! entries, persist the grouped artifact, apply the configured enrichment
//! stages, and split everything into indexable chunks. The persisted
//! artifacts are plain JSON so a later run can regroup without re-scraping.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::config::{ConfigError, PipelineConfig};
use crate::extract::{Extractor, RawElement};
use crate::group::{group_elements, group_raw_value, GroupedEntry};
use crate::split::{split_entries, Chunk};
use crate::synonyms::{augment_entries, inject_overview_entry, inject_synonym_entries, SynonymTable};
use crate::types::PipelineError;

/// Everything one run produced, stage by stage.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Flat records, one per extracted element, in scrape order.
    pub raw_elements: Vec<RawElement>,
    /// Grouped entries after the configured enrichment stages.
    pub grouped_entries: Vec<GroupedEntry>,
    /// Banner-prefixed chunks ready for indexing.
    pub chunks: Vec<Chunk>,
}

/// The scrape-to-chunks pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    synonyms: SynonymTable,
    extractor: Extractor,
}

impl Pipeline {
    /// Builds a pipeline with its own HTTP client.
    pub fn new(config: PipelineConfig, synonyms: SynonymTable) -> Result<Self, PipelineError> {
        let extractor = Extractor::new(config.url_processing.clone())?;
        Ok(Self {
            config,
            synonyms,
            extractor,
        })
    }

    /// Builds a pipeline around an existing extractor.
    pub fn from_parts(
        config: PipelineConfig,
        synonyms: SynonymTable,
        extractor: Extractor,
    ) -> Self {
        Self {
            config,
            synonyms,
            extractor,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage and returns the per-stage results.
    ///
    /// URLs that fail to fetch are skipped with an error log; artifact I/O
    /// failures and an empty URL list abort the run.
    pub async fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        if self.config.urls.is_empty() {
            return Err(ConfigError::MissingKey { key: "urls" }.into());
        }

        let raw_elements = self
            .extractor
            .scrape_urls(&self.config.urls, &self.config.tags)
            .await;
        write_json(&self.config.output_raw_file, &raw_elements).await?;

        let mut grouped_entries = group_elements(&raw_elements);
        write_json(&self.config.output_rag_grouping_file, &grouped_entries).await?;
        tracing::info!(entries = grouped_entries.len(), "grouped scraped records");

        let augmentation = &self.config.augmentation;
        if let Some(overview) = &augmentation.inject_overview {
            inject_overview_entry(overview, &mut grouped_entries);
        }
        if augmentation.inject_synonym_entries {
            inject_synonym_entries(&self.synonyms, &mut grouped_entries);
        }
        if augmentation.augment_synonyms {
            augment_entries(&self.synonyms, &mut grouped_entries);
        }

        let chunks = split_entries(&grouped_entries);
        tracing::info!(chunks = chunks.len(), "split entries into chunks");

        Ok(PipelineOutcome {
            raw_elements,
            grouped_entries,
            chunks,
        })
    }
}

/// Regroups a previously persisted raw artifact without re-scraping.
///
/// The raw records are re-validated, so a hand-edited artifact fails with
/// the index of the offending record.
pub async fn regroup(
    raw_path: impl AsRef<Path>,
    grouped_path: impl AsRef<Path>,
) -> Result<Vec<GroupedEntry>, PipelineError> {
    let content = tokio::fs::read_to_string(raw_path.as_ref()).await?;
    let value: Value = serde_json::from_str(&content)?;
    let entries = group_raw_value(&value)?;
    write_json(grouped_path.as_ref(), &entries).await?;
    Ok(entries)
}

/// Reads a persisted JSON artifact back as untyped records.
pub async fn read_json_records(path: impl AsRef<Path>) -> Result<Vec<Value>, PipelineError> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let value: Value = serde_json::from_str(&content)?;
    value.as_array().cloned().ok_or_else(|| {
        PipelineError::InvalidDocument(format!(
            "artifact at {} is not a JSON list",
            path.as_ref().display()
        ))
    })
}

/// Pretty-prints `value` to `path`, creating parent directories as needed.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let serialized = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, serialized).await?;
    tracing::info!(path = %path.display(), "wrote artifact");
    Ok(())
}
