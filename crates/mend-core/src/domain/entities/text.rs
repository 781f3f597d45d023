//! Spans, text changes, and the copy-on-write text buffer used to apply them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Byte range `[start, start + length)` inside a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Zero-length span: a pure insertion point.
    pub const fn at(offset: usize) -> Self {
        Self::new(offset, 0)
    }

    pub const fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Replace the text under `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub span: Span,
    pub new_text: String,
}

impl TextChange {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::at(offset),
            new_text: text.into(),
        }
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: text.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self {
            span,
            new_text: String::new(),
        }
    }
}

/// Immutable snapshot of a file's text.
///
/// Applying a batch never mutates the receiver; it yields a new buffer, so
/// the original is always available for an exact byte-for-byte restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    content: Arc<str>,
}

impl TextBuffer {
    pub fn new(content: impl Into<Arc<str>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }

    /// Byte offset of a 1-based `line`/`column` position.
    ///
    /// Columns count characters. A column one past the end of the line is
    /// valid (it addresses the newline / end of file).
    pub fn offset_of(&self, line: u32, column: u32) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let line_start = self.line_start(line)?;
        let line_text = self.content[line_start..]
            .split('\n')
            .next()
            .unwrap_or_default();

        let target = (column - 1) as usize;
        let mut chars = line_text.char_indices();
        let mut seen = 0;
        loop {
            match chars.next() {
                Some((idx, _)) if seen == target => return Some(line_start + idx),
                Some(_) => seen += 1,
                None if seen == target => return Some(line_start + line_text.len()),
                None => return None,
            }
        }
    }

    /// Byte span of a 1-based line including its trailing newline.
    pub fn line_span(&self, line: u32) -> Option<Span> {
        let start = self.line_start(line)?;
        let end = self.content[start..]
            .find('\n')
            .map_or(self.content.len(), |idx| start + idx + 1);
        Some(Span::new(start, end - start))
    }

    /// Offset just past the identifier-like token starting at `offset`.
    pub fn token_end(&self, offset: usize) -> Option<usize> {
        let rest = self.content.get(offset..)?;
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
            .map_or(rest.len(), |(idx, _)| idx);
        Some(offset + len)
    }

    /// Check that every change fits the buffer and that none overlap.
    pub fn validate_changes(&self, changes: &[TextChange]) -> Result<(), DomainError> {
        let mut ordered: Vec<&TextChange> = changes.iter().collect();
        ordered.sort_by_key(|c| (c.span.start, c.span.length));

        let mut cursor = 0usize;
        for (idx, change) in ordered.iter().enumerate() {
            let Span { start, .. } = change.span;
            let end = change.span.end();
            if end > self.content.len() {
                return Err(DomainError::SpanOutOfBounds {
                    start,
                    end,
                    len: self.content.len(),
                });
            }
            if !self.content.is_char_boundary(start) || !self.content.is_char_boundary(end) {
                return Err(DomainError::SpanNotOnCharBoundary { start, end });
            }
            if idx > 0 && start < cursor {
                return Err(DomainError::OverlappingSpans { offset: start });
            }
            cursor = end;
        }
        Ok(())
    }

    /// Apply all changes against this snapshot in one pass.
    ///
    /// Offsets always refer to the snapshot, never to a partially edited
    /// buffer, so there is no drift between spans.
    pub fn apply_batch(&self, changes: &[TextChange]) -> Result<TextBuffer, DomainError> {
        self.validate_changes(changes)?;

        let mut ordered: Vec<&TextChange> = changes.iter().collect();
        ordered.sort_by_key(|c| (c.span.start, c.span.length));

        let added: usize = ordered.iter().map(|c| c.new_text.len()).sum();
        let mut out = String::with_capacity(self.content.len() + added);
        let mut cursor = 0usize;
        for change in ordered {
            out.push_str(&self.content[cursor..change.span.start]);
            out.push_str(&change.new_text);
            cursor = change.span.end();
        }
        out.push_str(&self.content[cursor..]);

        Ok(TextBuffer::new(out))
    }

    fn line_start(&self, line: u32) -> Option<usize> {
        if line == 1 {
            return Some(0);
        }
        self.content
            .match_indices('\n')
            .nth((line - 2) as usize)
            .map(|(idx, _)| idx + 1)
            .filter(|start| *start <= self.content.len())
    }
}

impl From<String> for TextBuffer {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for TextBuffer {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "const a = 1;\nconst b = a.value;\n";

    #[test]
    fn offset_of_maps_line_and_column() {
        let buf = TextBuffer::from(SOURCE);
        assert_eq!(buf.offset_of(1, 1), Some(0));
        assert_eq!(buf.offset_of(2, 7), Some(19));
        assert_eq!(&SOURCE[19..20], "b");
        assert_eq!(buf.offset_of(9, 1), None);
        assert_eq!(buf.offset_of(1, 99), None);
    }

    #[test]
    fn line_span_includes_newline() {
        let buf = TextBuffer::from(SOURCE);
        let span = buf.line_span(1).unwrap();
        assert_eq!(&SOURCE[span.start..span.end()], "const a = 1;\n");
    }

    #[test]
    fn token_end_stops_at_punctuation() {
        let buf = TextBuffer::from(SOURCE);
        let start = buf.offset_of(2, 11).unwrap();
        let end = buf.token_end(start).unwrap();
        assert_eq!(&SOURCE[start..end], "a");
    }

    #[test]
    fn batch_uses_snapshot_offsets() {
        let buf = TextBuffer::from("abc");
        let changes = vec![
            TextChange::insert(3, "!"),
            TextChange::insert(0, ">>"),
            TextChange::replace(Span::new(1, 1), "B"),
        ];
        let out = buf.apply_batch(&changes).unwrap();
        assert_eq!(out.as_str(), ">>aBc!");
        assert_eq!(buf.as_str(), "abc");
    }

    #[test]
    fn overlapping_spans_are_rejected() {
        let buf = TextBuffer::from("abcdef");
        let changes = vec![
            TextChange::replace(Span::new(0, 3), "x"),
            TextChange::replace(Span::new(2, 2), "y"),
        ];
        assert!(matches!(
            buf.apply_batch(&changes),
            Err(DomainError::OverlappingSpans { offset: 2 })
        ));
    }

    #[test]
    fn out_of_bounds_span_is_rejected() {
        let buf = TextBuffer::from("abc");
        assert!(matches!(
            buf.apply_batch(&[TextChange::delete(Span::new(2, 5))]),
            Err(DomainError::SpanOutOfBounds { .. })
        ));
    }

    #[test]
    fn span_inside_multibyte_char_is_rejected() {
        let buf = TextBuffer::from("é");
        assert!(matches!(
            buf.apply_batch(&[TextChange::insert(1, "x")]),
            Err(DomainError::SpanNotOnCharBoundary { .. })
        ));
    }
}
