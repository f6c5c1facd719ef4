//! Shared error taxonomy for the document-to-index pipeline.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the pipeline stages.
///
/// Fetch failures are recovered per URL inside the extraction loop; every
/// other variant aborts the batch that raised it and carries enough context
/// (URL, record index, key, or path) to diagnose without re-running.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Network transport or non-2xx HTTP failure while fetching a page.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Building or driving the HTTP client failed outside a per-URL fetch.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed grouping input; `index` names the offending record.
    #[error("invalid grouping input at index {index}: {message}")]
    Validation { index: usize, message: String },

    /// Missing or unparsable configuration, fatal at startup.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A persisted artifact failed to (de)serialize.
    #[error("artifact serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// Document could not be parsed or contains no usable content.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
