//! Documentation-to-index pipeline: scrape HTML docs, group them into
//! h1-rooted Markdown sections, enrich them with synonyms, and split them
//! into banner-prefixed chunks ready for a vector index.
//!
//! ```text
//! Configured URLs ──► extract::Extractor ──► RawElement stream
//!                                              │ (scraped_docs.json)
//!                                              ▼
//!                     group::group_elements ──► GroupedEntry list
//!                                              │ (rag_ready_groups.json)
//!                                              ▼
//!                     synonyms::{augment, inject} ──► enriched entries
//!                                              │
//!                                              ▼
//!                     split::split_entries ──► Chunk list
//!                                              │
//!                                              ▼
//!                     index::VectorIndex ──► retrieval + dedup::deduplicate
//! ```
//!
//! [`pipeline::Pipeline`] drives the stages end to end; each stage is also
//! usable on its own against persisted artifacts.

pub mod answer;
pub mod config;
pub mod dedup;
pub mod extract;
pub mod group;
pub mod index;
pub mod pipeline;
pub mod split;
pub mod synonyms;
pub mod types;

pub use answer::format_answer;
pub use config::{Augmentation, ConfigError, PipelineConfig, UrlProcessing};
pub use dedup::deduplicate;
pub use extract::{Extractor, RawElement, Tag};
pub use group::{group_elements, group_raw_records, group_raw_value, GroupedEntry};
pub use index::{retrieve_deduplicated, ChatModel, VectorIndex};
pub use pipeline::{regroup, Pipeline, PipelineOutcome};
pub use split::{split_entries, split_entry, Chunk, ChunkMetadata};
pub use synonyms::{
    augment_entries, inject_overview_entry, inject_synonym_entries, OverviewConfig, SynonymEntry,
    SynonymTable,
};
pub use types::PipelineError;
