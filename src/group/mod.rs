//! Section grouping.
//!
//! Consumes the flat stream of tagged records produced by [`crate::extract`]
//! and reconstructs h1-rooted sections: every `h1` starts a new
//! [`GroupedEntry`], deeper headings and body tags append Markdown blocks to
//! the open one, and a source change without a new heading closes it. Text is
//! cleaned of pictographic noise and pilcrows before grouping.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

use crate::extract::RawElement;
use crate::types::PipelineError;

/// Pictographic / emoji ranges removed from every record's text.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\u{1F600}-\u{1F64F}\u{1F300}-\u{1F5FF}\u{1F680}-\u{1F6FF}\u{1F1E0}-\u{1F1FF}\u{2700}-\u{27BF}\u{24C2}-\u{1F251}\u{1F900}-\u{1F9FF}\u{1FA70}-\u{1FAFF}\u{1F780}-\u{1F7FF}\u{1F800}-\u{1F8FF}]+",
    )
    .unwrap()
});

/// One h1-rooted section of a source page.
///
/// Never constructed with an empty `title` or `content`; `length` is the
/// character count of `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedEntry {
    pub source: String,
    pub title: String,
    pub content: String,
    pub length: usize,
}

impl GroupedEntry {
    /// Recomputes `length` after the content was mutated.
    pub(crate) fn refresh_length(&mut self) {
        self.length = self.content.chars().count();
    }
}

/// Strips emoji ranges and pilcrows, then trims.
fn normalize_text(text: &str) -> String {
    let stripped = EMOJI_RE.replace_all(text.trim(), "");
    stripped.replace('¶', "").trim().to_string()
}

/// Validates that every record is an object carrying `source`, `tag`, `text`.
///
/// The first offense aborts with [`PipelineError::Validation`] naming the
/// record's index; no partial output is produced.
pub fn validate_records(records: &[Value]) -> Result<(), PipelineError> {
    for (index, record) in records.iter().enumerate() {
        let Some(object) = record.as_object() else {
            return Err(PipelineError::Validation {
                index,
                message: "record is not a JSON object".to_string(),
            });
        };
        for key in ["source", "tag", "text"] {
            if !object.contains_key(key) {
                return Err(PipelineError::Validation {
                    index,
                    message: format!("missing key '{key}'"),
                });
            }
        }
    }
    Ok(())
}

/// Groups an untyped record list, as read back from the raw scrape artifact.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDocument`] when the value is not a list
/// and [`PipelineError::Validation`] for the first malformed record.
pub fn group_raw_value(value: &Value) -> Result<Vec<GroupedEntry>, PipelineError> {
    let records = value.as_array().ok_or_else(|| {
        PipelineError::InvalidDocument("grouping input must be a list of objects".to_string())
    })?;
    group_raw_records(records)
}

/// Groups a list of untyped records after validating their shape.
pub fn group_raw_records(records: &[Value]) -> Result<Vec<GroupedEntry>, PipelineError> {
    validate_records(records)?;
    Ok(group_stream(records.iter().map(|record| {
        (
            record.get("source").and_then(Value::as_str).unwrap_or(""),
            record.get("tag").and_then(Value::as_str).unwrap_or(""),
            record.get("text").and_then(Value::as_str).unwrap_or(""),
        )
    })))
}

/// Groups typed records coming straight from the extractor.
pub fn group_elements(elements: &[RawElement]) -> Vec<GroupedEntry> {
    group_stream(
        elements
            .iter()
            .map(|element| (element.source.as_str(), element.tag.as_str(), element.text.as_str())),
    )
}

fn group_stream<'a>(records: impl Iterator<Item = (&'a str, &'a str, &'a str)>) -> Vec<GroupedEntry> {
    let mut entries = Vec::new();
    let mut current_source = String::new();
    let mut current_title: Option<String> = None;
    let mut current_content: Vec<String> = Vec::new();

    for (source, tag, text) in records {
        let text = normalize_text(text);
        match tag {
            "h1" => {
                flush_group(
                    &mut entries,
                    &current_source,
                    current_title.as_deref(),
                    &current_content,
                );
                current_content = vec![format!("# {text}")];
                current_title = Some(text);
                current_source = source.to_string();
            }
            "h2" => current_content.push(format!("## {text}")),
            "h3" => current_content.push(format!("### {text}")),
            "h4" => current_content.push(format!("#### {text}")),
            "p" | "pre" | "code" | "ul" | "li" => current_content.push(text),
            _ => {
                // Implicit source boundary without a new heading: close the
                // open section and wait for the next h1. Anything arriving
                // before it contributes to no entry.
                if !source.is_empty() && source != current_source && current_title.is_some() {
                    flush_group(
                        &mut entries,
                        &current_source,
                        current_title.as_deref(),
                        &current_content,
                    );
                    current_title = None;
                    current_content = Vec::new();
                    current_source = source.to_string();
                }
            }
        }
    }

    flush_group(
        &mut entries,
        &current_source,
        current_title.as_deref(),
        &current_content,
    );
    entries
}

/// Seals the accumulator into an entry, dropping it when either the title or
/// the joined content is empty.
fn flush_group(
    entries: &mut Vec<GroupedEntry>,
    source: &str,
    title: Option<&str>,
    content: &[String],
) {
    let Some(title) = title else {
        return;
    };
    if title.is_empty() || content.is_empty() {
        return;
    }
    let joined = content.join("\n\n").trim().to_string();
    if joined.is_empty() {
        return;
    }
    entries.push(GroupedEntry {
        source: source.to_string(),
        title: title.to_string(),
        length: joined.chars().count(),
        content: joined,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(source: &str, tag: &str, text: &str) -> Value {
        json!({"source": source, "tag": tag, "text": text})
    }

    #[test]
    fn two_headings_yield_two_entries() {
        let records = vec![
            record("u1", "h1", "Intro"),
            record("u1", "p", "Hello"),
            record("u1", "h1", "Next"),
            record("u1", "p", "World"),
        ];
        let entries = group_raw_records(&records).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Intro");
        assert_eq!(entries[0].content, "# Intro\n\nHello");
        assert_eq!(entries[0].source, "u1");
        assert_eq!(entries[1].title, "Next");
        assert_eq!(entries[1].content, "# Next\n\nWorld");
        assert_eq!(entries[1].length, entries[1].content.chars().count());
    }

    #[test]
    fn deeper_headings_become_markdown_levels() {
        let records = vec![
            record("u1", "h1", "Title"),
            record("u1", "h2", "Sub"),
            record("u1", "h3", "Deeper"),
            record("u1", "h4", "Deepest"),
            record("u1", "code", "```\nx\n```"),
        ];
        let entries = group_raw_records(&records).unwrap();
        assert_eq!(
            entries[0].content,
            "# Title\n\n## Sub\n\n### Deeper\n\n#### Deepest\n\n```\nx\n```"
        );
    }

    #[test]
    fn missing_key_reports_offending_index() {
        let records = vec![
            record("u1", "h1", "Intro"),
            json!({"source": "u1", "tag": "p"}),
        ];
        let err = group_raw_records(&records).unwrap_err();
        match err {
            PipelineError::Validation { index, message } => {
                assert_eq!(index, 1);
                assert!(message.contains("text"));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn non_list_input_is_rejected() {
        let err = group_raw_value(&json!({"not": "a list"})).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDocument(_)));
    }

    #[test]
    fn emoji_and_pilcrow_noise_is_stripped() {
        let records = vec![
            record("u1", "h1", "Setup \u{1F680}¶"),
            record("u1", "p", "Works \u{2705} fine"),
        ];
        let entries = group_raw_records(&records).unwrap();
        assert_eq!(entries[0].title, "Setup");
        assert_eq!(entries[0].content, "# Setup\n\nWorks  fine");
    }

    #[test]
    fn content_before_any_heading_is_dropped() {
        let records = vec![record("u1", "p", "orphan"), record("u1", "h1", "Start")];
        let entries = group_raw_records(&records).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "# Start");
    }

    #[test]
    fn source_change_without_heading_discards_trailing() {
        // A tag outside the grouped set carrying a new source closes the open
        // section; body tags before the next h1 land nowhere.
        let records = vec![
            record("u1", "h1", "First"),
            record("u1", "p", "body"),
            record("u2", "h5", "stray"),
            record("u2", "p", "lost"),
            record("u2", "h1", "Second"),
            record("u2", "p", "kept"),
        ];
        let entries = group_raw_records(&records).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, "u1");
        assert_eq!(entries[0].content, "# First\n\nbody");
        assert_eq!(entries[1].content, "# Second\n\nkept");
        assert!(!entries.iter().any(|entry| entry.content.contains("lost")));
    }

    #[test]
    fn no_entry_has_empty_title_or_content() {
        let records = vec![
            record("u1", "h1", "\u{1F600}"),
            record("u1", "p", "invisible"),
            record("u1", "h1", "Visible"),
        ];
        let entries = group_raw_records(&records).unwrap();
        for entry in &entries {
            assert!(!entry.title.is_empty());
            assert!(!entry.content.is_empty());
        }
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Visible");
    }
}
