//! Order-preserving deduplication of retrieved chunks.

use std::collections::HashSet;

use crate::split::Chunk;

/// Drops chunks whose trimmed `page_content` was already seen, keeping the
/// first occurrence of each and the original order.
pub fn deduplicate(chunks: &[Chunk]) -> Vec<Chunk> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(chunks.len());
    chunks
        .iter()
        .filter(|chunk| seen.insert(chunk.page_content.trim()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::ChunkMetadata;

    fn chunk(content: &str) -> Chunk {
        Chunk {
            page_content: content.to_string(),
            metadata: ChunkMetadata {
                source_url: "u".to_string(),
                title: "t".to_string(),
                h1: None,
                h2: None,
                h3: None,
                h4: None,
                section_path: String::new(),
            },
        }
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let chunks = vec![chunk("a"), chunk("b"), chunk("a")];
        let unique = deduplicate(&chunks);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].page_content, "a");
        assert_eq!(unique[1].page_content, "b");
    }

    #[test]
    fn compares_trimmed_content() {
        let chunks = vec![chunk("a"), chunk("  a \n")];
        assert_eq!(deduplicate(&chunks).len(), 1);
    }

    #[test]
    fn is_idempotent() {
        let chunks = vec![chunk("x"), chunk("y"), chunk("x"), chunk("z")];
        let once = deduplicate(&chunks);
        let twice = deduplicate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn output_never_exceeds_input() {
        let chunks = vec![chunk("x"), chunk("x"), chunk("x")];
        assert!(deduplicate(&chunks).len() <= chunks.len());
        assert!(deduplicate(&[]).is_empty());
    }
}
