//! Configuration for the scraping and indexing pipeline.
//!
//! A [`PipelineConfig`] describes one scraping run: which URLs to visit,
//! which HTML tags to extract, where the raw and grouped JSON artifacts are
//! written, and how the enrichment stages behave. Configs load from YAML or
//! JSON files, dispatched on the file extension, with serde defaults filling
//! anything omitted.
//!
//! ## Example
//!
//! ```yaml
//! urls:
//!   - https://docs.example.com/intro/
//!   - https://docs.example.com/usage/
//! tags: [h1, h2, h3, h4, p, pre, li, ul]
//! output_raw_file: scraped_docs.json
//! output_rag_grouping_file: rag_ready_groups.json
//! url_processing:
//!   resolve_relative_urls: true
//!   log_url_changes: false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::Tag;
use crate::synonyms::OverviewConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    FileRead {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("failed to parse {format} config at {path}: {source}")]
    Parse {
        /// Format that failed to parse (YAML or JSON).
        format: &'static str,
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying parse error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unsupported or unrecognised configuration file extension.
    #[error("unsupported config file format: {message}")]
    UnsupportedFormat {
        /// Description of the problem.
        message: String,
    },

    /// A required top-level key was absent.
    #[error("config is missing required key '{key}'")]
    MissingKey {
        /// Name of the missing key.
        key: &'static str,
    },

    /// Structurally valid config carrying invalid values.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Relative-URL handling options for the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlProcessing {
    /// Resolve relative hrefs against the page URL (default `true`).
    pub resolve_relative_urls: bool,
    /// Emit a debug line whenever resolution changes a value (default `false`).
    pub log_url_changes: bool,
}

impl Default for UrlProcessing {
    fn default() -> Self {
        Self {
            resolve_relative_urls: true,
            log_url_changes: false,
        }
    }
}

/// Flags controlling the enrichment stages between grouping and splitting.
///
/// Defaults match the canonical run: inline synonym augmentation on, entry
/// injection off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Augmentation {
    /// Append `(Synonyms: …)` blocks to matching entries (default `true`).
    pub augment_synonyms: bool,
    /// Prepend one standalone definition entry per canonical term (default `false`).
    pub inject_synonym_entries: bool,
    /// Prepend a synthetic overview entry listing titles from a source subset.
    pub inject_overview: Option<OverviewConfig>,
}

impl Default for Augmentation {
    fn default() -> Self {
        Self {
            augment_synonyms: true,
            inject_synonym_entries: false,
            inject_overview: None,
        }
    }
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ordered page URLs to scrape. Must be non-empty at run time.
    pub urls: Vec<String>,
    /// HTML tags to extract.
    pub tags: Vec<Tag>,
    /// Destination of the raw scrape artifact.
    pub output_raw_file: PathBuf,
    /// Destination of the grouped, RAG-ready artifact.
    pub output_rag_grouping_file: PathBuf,
    /// Relative-URL handling.
    pub url_processing: UrlProcessing,
    /// Enrichment stage flags.
    pub augmentation: Augmentation,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            tags: Tag::DEFAULT_SET.to_vec(),
            output_raw_file: PathBuf::from("scraped_docs.json"),
            output_rag_grouping_file: PathBuf::from("rag_ready_groups.json"),
            url_processing: UrlProcessing::default(),
            augmentation: Augmentation::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from a `.yaml`, `.yml`, or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, the extension is
    /// unrecognised, or the contents fail to parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_config_file(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                    format: "YAML",
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })
            }
            Some("json") => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                format: "JSON",
                path: path.to_path_buf(),
                source: Box::new(e),
            }),
            _ => Err(ConfigError::UnsupportedFormat {
                message: "file extension must be .yaml, .yml, or .json".to_string(),
            }),
        }
    }
}

pub(crate) fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}
