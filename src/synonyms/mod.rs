//! Synonym-aware augmentation of grouped entries.
//!
//! A [`SynonymTable`] maps canonical terms to alternate phrasings. The table
//! drives two independent enrichment modes over the grouped document set:
//! inline augmentation appends a `(Synonyms: …)` block to every entry that
//! mentions a term (or any variant of it), and entry injection prepends one
//! standalone definition entry per canonical term. A third, source-filtered
//! overview injection prepends a synthetic table-of-contents entry.
//!
//! Matching is case-insensitive and covers a naive English plural (`+"s"`) of
//! the canonical term and of every synonym. Augmentation itself never fails;
//! only loading a malformed table does.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::config::{read_config_file, ConfigError};
use crate::group::GroupedEntry;

/// Source value assigned to injected entries.
pub const SYNTHETIC_SOURCE: &str = "synthetic";

/// One canonical term with its ordered synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub canonical: String,
    pub synonyms: Vec<String>,
}

impl SynonymEntry {
    /// Every matching variant: the canonical term, its plural, each synonym,
    /// and each synonym's plural.
    fn variants(&self) -> Vec<String> {
        let mut variants = vec![self.canonical.clone(), format!("{}s", self.canonical)];
        for synonym in &self.synonyms {
            variants.push(synonym.clone());
            variants.push(format!("{synonym}s"));
        }
        variants
    }
}

/// Read-only table of canonical terms, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<SynonymEntry>,
}

impl SynonymTable {
    /// Builds a table, rejecting empty terms or synonym strings.
    pub fn new(entries: Vec<SynonymEntry>) -> Result<Self, ConfigError> {
        for entry in &entries {
            if entry.canonical.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "synonym table contains an empty canonical term".to_string(),
                ));
            }
            if entry.synonyms.iter().any(|synonym| synonym.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "synonym list for '{}' contains an empty string",
                    entry.canonical
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Loads the table from the `SYNONYMS` key of a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when the top-level `SYNONYMS`
    /// mapping is absent, and parse errors for anything malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = read_config_file(path)?;

        let raw: RawSynonymsConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                        format: "YAML",
                        path: path.to_path_buf(),
                        source: Box::new(e),
                    })?;
                if value.get("SYNONYMS").is_none() {
                    return Err(ConfigError::MissingKey { key: "SYNONYMS" });
                }
                serde_yaml::from_value(value).map_err(|e| ConfigError::Parse {
                    format: "YAML",
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?
            }
            Some("json") => {
                let value: serde_json::Value =
                    serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                        format: "JSON",
                        path: path.to_path_buf(),
                        source: Box::new(e),
                    })?;
                if value.get("SYNONYMS").is_none() {
                    return Err(ConfigError::MissingKey { key: "SYNONYMS" });
                }
                serde_json::from_value(value).map_err(|e| ConfigError::Parse {
                    format: "JSON",
                    path: path.to_path_buf(),
                    source: Box::new(e),
                })?
            }
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    message: "file extension must be .yaml, .yml, or .json".to_string(),
                });
            }
        };

        Self::new(raw.synonyms)
    }

    /// Entries in table order.
    pub fn entries(&self) -> &[SynonymEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawSynonymsConfig {
    #[serde(rename = "SYNONYMS", deserialize_with = "deserialize_entries")]
    synonyms: Vec<SynonymEntry>,
}

/// Deserializes the `SYNONYMS` mapping into entries preserving file order.
fn deserialize_entries<'de, D>(deserializer: D) -> Result<Vec<SynonymEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<SynonymEntry>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping of canonical terms to synonym lists")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::new();
            while let Some((canonical, synonyms)) = map.next_entry::<String, Vec<String>>()? {
                entries.push(SynonymEntry {
                    canonical,
                    synonyms,
                });
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

/// Appends a `(Synonyms: …)` block to every entry mentioning a known term.
///
/// Containment is tested against the entry's lowercased title and content as
/// they were before augmentation, so terms match independently and each
/// matching canonical term appends its own block. The variants inside the
/// parenthetical are rendered sorted.
pub fn augment_entries(table: &SynonymTable, entries: &mut [GroupedEntry]) {
    for entry in entries.iter_mut() {
        let title = entry.title.to_lowercase();
        let content = entry.content.to_lowercase();
        let mut augmented = false;

        for synonym_entry in table.entries() {
            let variants = synonym_entry.variants();
            let matched = variants.iter().any(|variant| {
                let variant = variant.to_lowercase();
                title.contains(&variant) || content.contains(&variant)
            });
            if matched {
                let unique: BTreeSet<String> = variants.into_iter().collect();
                let joined = unique.into_iter().collect::<Vec<_>>().join(", ");
                entry.content.push_str("\n\n(Synonyms: ");
                entry.content.push_str(&joined);
                entry.content.push(')');
                augmented = true;
            }
        }

        if augmented {
            entry.refresh_length();
        }
    }
}

/// Prepends one standalone definition entry per canonical term, in table
/// order.
pub fn inject_synonym_entries(table: &SynonymTable, entries: &mut Vec<GroupedEntry>) {
    for (position, synonym_entry) in table.entries().iter().enumerate() {
        let content = format!(
            "{} can also be referred to as: {}",
            synonym_entry.canonical,
            synonym_entry.synonyms.join(", ")
        );
        entries.insert(
            position,
            GroupedEntry {
                source: SYNTHETIC_SOURCE.to_string(),
                title: format!("Synonyms for {}", synonym_entry.canonical),
                length: content.chars().count(),
                content,
            },
        );
    }
    if !table.is_empty() {
        tracing::info!(terms = table.len(), "injected synonym definition entries");
    }
}

/// Synthetic overview entry configuration: collect the titles of entries
/// whose source contains `source_filter` and prepend them as one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewConfig {
    /// Substring matched against entry sources.
    pub source_filter: String,
    /// Source assigned to the injected entry.
    pub source: String,
    /// Title of the injected entry.
    pub title: String,
}

/// Prepends a synthetic entry listing the titles of a source subset.
///
/// No entry is injected when nothing matches the filter.
pub fn inject_overview_entry(config: &OverviewConfig, entries: &mut Vec<GroupedEntry>) {
    let titles: Vec<String> = entries
        .iter()
        .filter(|entry| entry.source.contains(&config.source_filter))
        .map(|entry| entry.title.replace('¶', "").trim().to_string())
        .collect();
    if titles.is_empty() {
        return;
    }

    let content = titles
        .iter()
        .map(|title| format!("- {title}"))
        .collect::<Vec<_>>()
        .join("\n");
    tracing::info!(titles = titles.len(), "injected overview entry");
    entries.insert(
        0,
        GroupedEntry {
            source: config.source.clone(),
            title: config.title.clone(),
            length: content.chars().count(),
            content,
        },
    );
}
