//! Presentation cleanup for generated answers.
//!
//! Model output tends to arrive with ragged blank runs and code blocks whose
//! indentation reflects the prompt rather than the code. [`format_answer`]
//! normalizes it for terminal display: prose paragraphs are separated by
//! exactly one blank line, fenced code blocks are dedented and padded with a
//! blank line on each side, and the result ends with a single newline.

use regex::Regex;
use std::sync::LazyLock;

/// Fenced code block, optional language hint, non-greedy body.
static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_]*\n.*?```").unwrap());

/// Run of two or more newlines, possibly holding whitespace.
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Normalizes whitespace and code-block layout in a generated answer.
pub fn format_answer(answer: &str) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    for found in CODE_BLOCK_RE.find_iter(answer) {
        push_prose(&mut out, &answer[cursor..found.start()]);
        push_code(&mut out, found.as_str());
        cursor = found.end();
    }
    push_prose(&mut out, &answer[cursor..]);

    let trimmed = out.trim_matches('\n');
    format!("{trimmed}\n")
}

fn push_prose(out: &mut String, text: &str) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    let collapsed = BLANK_RUN_RE.replace_all(trimmed, "\n\n");
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&collapsed);
}

fn push_code(out: &mut String, block: &str) {
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    let inner = block.strip_suffix("```").unwrap_or(block);
    let (fence, body) = inner.split_once('\n').unwrap_or((inner, ""));
    let body_lines: Vec<&str> = body.trim_matches('\n').lines().collect();
    let dedented = dedent(&body_lines).join("\n");

    out.push_str(fence.trim_end());
    out.push('\n');
    if !dedented.is_empty() {
        out.push_str(&dedented);
        out.push('\n');
    }
    out.push_str("```");
}

/// Removes the common leading-whitespace width from every non-blank line.
fn dedent(lines: &[&str]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line.chars().skip(indent).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_runs_collapse_to_one_blank_line() {
        let formatted = format_answer("First paragraph.\n\n\n\nSecond paragraph.");
        assert_eq!(formatted, "First paragraph.\n\nSecond paragraph.\n");
    }

    #[test]
    fn code_blocks_are_separated_from_prose() {
        let formatted = format_answer("Run this:\n```rust\nfn main() {}\n```\nDone.");
        assert_eq!(
            formatted,
            "Run this:\n\n```rust\nfn main() {}\n```\n\nDone.\n"
        );
    }

    #[test]
    fn code_blocks_are_dedented() {
        let formatted = format_answer("```python\n    def f():\n        pass\n```");
        assert_eq!(formatted, "```python\ndef f():\n    pass\n```\n");
    }

    #[test]
    fn relative_indentation_is_preserved() {
        let formatted = format_answer("```\n  a\n    b\n  c\n```");
        assert_eq!(formatted, "```\na\n  b\nc\n```\n");
    }

    #[test]
    fn output_ends_with_exactly_one_newline() {
        for answer in ["plain", "plain\n\n\n", "\n\nplain"] {
            let formatted = format_answer(answer);
            assert!(formatted.ends_with('\n'));
            assert!(!formatted.ends_with("\n\n"));
        }
    }

    #[test]
    fn empty_answer_becomes_single_newline() {
        assert_eq!(format_answer("   \n "), "\n");
    }
}
