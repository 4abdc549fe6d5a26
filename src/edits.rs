//! Line-range edits suggested by the idea assistant.
//!
//! The assistant proposes replacements as `(start_line, end_line,
//! updated_text)` triples against the current section text.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How far past the end of the text an edit may reach. Edits beyond this are
/// skipped rather than padding the text with empty lines.
pub const MAX_PADDING_LINES: usize = 1024;

/// Replace lines `start_line..=end_line` (0-based) with `updated_text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineEdit {
    pub start_line: usize,
    pub end_line: usize,
    pub updated_text: String,
}

impl LineEdit {
    pub fn new(start_line: usize, end_line: usize, updated_text: impl Into<String>) -> Self {
        Self {
            start_line,
            end_line,
            updated_text: updated_text.into(),
        }
    }
}

/// Apply `edits` to `content` and return the new text.
///
/// Edits are applied bottom-up (by descending `start_line`) so earlier line
/// numbers stay valid. Missing lines are padded with empty ones, up to
/// [`MAX_PADDING_LINES`] past the end; edits reaching further are skipped.
/// An edit whose `end_line` precedes its `start_line` inserts without
/// removing. Trailing newlines are stripped from the result.
///
/// # Example
/// ```
/// use foresight::edits::{apply_line_edits, LineEdit};
///
/// let text = "# Idea\nold pitch\nfooter";
/// let edited = apply_line_edits(text, vec![LineEdit::new(1, 1, "new pitch")]);
/// assert_eq!(edited, "# Idea\nnew pitch\nfooter");
/// ```
pub fn apply_line_edits(content: &str, mut edits: Vec<LineEdit>) -> String {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    edits.sort_by(|a, b| b.start_line.cmp(&a.start_line));

    for edit in edits {
        if edit.end_line >= lines.len().saturating_add(MAX_PADDING_LINES) {
            warn!(
                start_line = edit.start_line,
                end_line = edit.end_line,
                lines = lines.len(),
                "skipping edit far beyond the end of the text"
            );
            continue;
        }

        if lines.len() <= edit.end_line {
            lines.resize(edit.end_line + 1, String::new());
        }

        let start = edit.start_line.min(lines.len());
        let end = edit.end_line.min(lines.len() - 1);
        let removed = if end >= start { end - start + 1 } else { 0 };

        lines.splice(start..start + removed, std::iter::once(edit.updated_text));
    }

    lines.join("\n").trim_end_matches('\n').to_string()
}
