/*!
# Replacement buffer

Accumulates text edits keyed by file path. Within a file, edit ranges must
not intersect; a violating edit fails with `ReplacementOverlap` and the run
aborts with nothing written. Flushing walks the original buffer once,
emitting original bytes or replacement text at each edit boundary.
*/

use crate::core::{PatchError, Result, Span};
use std::collections::BTreeMap;

/// Per-edit options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// After applying the edit, drop the surrounding line (terminator
    /// included) when only whitespace remains on it.
    pub remove_line_if_empty: bool,
}

#[derive(Debug, Clone)]
struct Edit {
    span: Span,
    text: String,
    options: RewriteOptions,
    /// Insertion-order tiebreak for same-offset point edits.
    sequence: usize,
}

/// Non-overlapping text edits over one or more files.
#[derive(Debug, Default)]
pub struct Rewriter {
    files: BTreeMap<String, Vec<Edit>>,
    next_sequence: usize,
}

impl Rewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any edit has been recorded.
    pub fn is_empty(&self) -> bool {
        self.files.values().all(Vec::is_empty)
    }

    /// Number of edits recorded for a file.
    pub fn edit_count(&self, file: &str) -> usize {
        self.files.get(file).map(Vec::len).unwrap_or(0)
    }

    /// Inserts `text` at a point.
    pub fn insert(&mut self, file: &str, offset: usize, text: impl Into<String>) -> Result<()> {
        self.replace_with_options(file, Span::point(offset), text, RewriteOptions::default())
    }

    /// Removes a range.
    pub fn remove(&mut self, file: &str, span: Span) -> Result<()> {
        self.replace_with_options(file, span, "", RewriteOptions::default())
    }

    /// Removes a range, dropping its line when the removal leaves it blank.
    pub fn remove_with_line(&mut self, file: &str, span: Span) -> Result<()> {
        self.replace_with_options(
            file,
            span,
            "",
            RewriteOptions {
                remove_line_if_empty: true,
            },
        )
    }

    /// Replaces a range with `text`.
    pub fn replace(&mut self, file: &str, span: Span, text: impl Into<String>) -> Result<()> {
        self.replace_with_options(file, span, text, RewriteOptions::default())
    }

    pub fn replace_with_options(
        &mut self,
        file: &str,
        span: Span,
        text: impl Into<String>,
        options: RewriteOptions,
    ) -> Result<()> {
        let edits = self.files.entry(file.to_string()).or_default();
        if let Some(existing) = edits.iter().find(|e| e.span.intersects(&span)) {
            return Err(PatchError::ReplacementOverlap {
                file: file.to_string(),
                existing: existing.span,
                conflicting: span,
            });
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        edits.push(Edit {
            span,
            text: text.into(),
            options,
            sequence,
        });
        tracing::trace!(file, %span, "edit recorded");
        Ok(())
    }

    /// Files with recorded edits.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Materializes the rewritten buffer for one file.
    pub fn apply(&self, file: &str, source: &str) -> Result<String> {
        let Some(edits) = self.files.get(file) else {
            return Ok(source.to_string());
        };
        let mut ordered: Vec<&Edit> = edits.iter().collect();
        ordered.sort_by_key(|e| (e.span.begin, e.span.end, e.sequence));

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0usize;
        // Output positions of edits that asked for blank-line removal.
        let mut flagged: Vec<usize> = Vec::new();
        for edit in &ordered {
            if edit.span.begin < cursor {
                // Two recorded spans turned out to interleave; the add-time
                // check makes this unreachable, but fail loudly over
                // corrupting output.
                return Err(PatchError::ReplacementOverlap {
                    file: file.to_string(),
                    existing: Span::new(cursor, cursor),
                    conflicting: edit.span,
                });
            }
            out.push_str(source.get(cursor..edit.span.begin).ok_or_else(|| {
                PatchError::RangeUnavailable {
                    file: file.to_string(),
                    span: edit.span,
                }
            })?);
            if edit.options.remove_line_if_empty {
                flagged.push(out.len());
            }
            out.push_str(&edit.text);
            cursor = edit.span.end;
        }
        out.push_str(source.get(cursor..).unwrap_or(""));

        // Blank-line cleanup, back to front so earlier offsets stay valid.
        for &pos in flagged.iter().rev() {
            remove_line_if_blank(&mut out, pos);
        }
        Ok(out)
    }
}

/// Deletes the line containing `pos` when it holds only whitespace.
fn remove_line_if_blank(text: &mut String, pos: usize) {
    let pos = pos.min(text.len());
    let line_begin = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[pos..]
        .find('\n')
        .map(|i| pos + i + 1)
        .unwrap_or(text.len());
    let line = &text[line_begin..line_end];
    if !line.trim().is_empty() {
        return;
    }
    text.replace_range(line_begin..line_end, "");
}
