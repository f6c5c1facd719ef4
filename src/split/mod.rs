//! Header-based chunk splitting.
//!
//! Splits each [`GroupedEntry`]'s Markdown content at heading lines (`#`
//! through `####`) into retrieval-sized [`Chunk`]s. Every chunk keeps the
//! heading lines it fell under, carries the active heading at each level in
//! its metadata, and is prefixed with a `[Section: …]` banner so the section
//! path survives embedding.

use serde::{Deserialize, Serialize};

use crate::group::GroupedEntry;

/// Provenance and section context of one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// URL of the page the chunk came from.
    pub source_url: String,
    /// Title of the grouped entry the chunk was split from.
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h4: Option<String>,
    /// Active headings joined with `" > "`, shallowest first.
    pub section_path: String,
}

/// One retrieval unit: banner-prefixed text plus section metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub page_content: String,
    pub metadata: ChunkMetadata,
}

const HEADER_PREFIXES: [(&str, usize); 4] = [("# ", 0), ("## ", 1), ("### ", 2), ("#### ", 3)];

/// Splits one grouped entry at its heading lines.
///
/// A new chunk opens at every heading line; the heading line itself stays in
/// the chunk body, and headings deeper than the one just seen are cleared
/// from the active set. Lines inside a fenced code block are always body
/// text, so a `#` comment in a code sample never opens a chunk. Bodies that
/// trim to nothing produce no chunk.
pub fn split_entry(entry: &GroupedEntry) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut headers: [Option<String>; 4] = [None, None, None, None];
    let mut body: Vec<&str> = Vec::new();
    let mut in_code_block = false;

    for line in entry.content.lines() {
        if line.starts_with("```") {
            in_code_block = !in_code_block;
        } else if !in_code_block {
            if let Some((prefix, level)) = HEADER_PREFIXES
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix))
            {
                seal_chunk(&mut chunks, entry, &headers, &body);
                body.clear();
                headers[*level] = Some(line[prefix.len()..].trim().to_string());
                for deeper in &mut headers[level + 1..] {
                    *deeper = None;
                }
            }
        }
        body.push(line);
    }
    seal_chunk(&mut chunks, entry, &headers, &body);
    chunks
}

/// Splits every entry, preserving entry order.
pub fn split_entries(entries: &[GroupedEntry]) -> Vec<Chunk> {
    entries.iter().flat_map(split_entry).collect()
}

fn seal_chunk(
    chunks: &mut Vec<Chunk>,
    entry: &GroupedEntry,
    headers: &[Option<String>; 4],
    body: &[&str],
) {
    let text = body.join("\n").trim().to_string();
    if text.is_empty() {
        return;
    }
    let section_path = headers
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" > ");
    chunks.push(Chunk {
        page_content: format!("[Section: {section_path}]\n\n{text}"),
        metadata: ChunkMetadata {
            source_url: entry.source.clone(),
            title: entry.title.clone(),
            h1: headers[0].clone(),
            h2: headers[1].clone(),
            h3: headers[2].clone(),
            h4: headers[3].clone(),
            section_path,
        },
    });
}
