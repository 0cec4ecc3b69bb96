//! Byte-offset tracking within a single operation line
//!
//! Every event emitted by the tokenizer is tagged with the byte offset it
//! starts at. Spans cover a half-open byte range of the same line and are
//! used by diagnostics to point at the offending token.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open byte range `[start, end)` within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// A span covering `len` bytes from `start`
    pub fn at(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    /// Create a single-byte span
    pub fn single(offset: usize) -> Self {
        Self::at(offset, 1)
    }

    /// Combine this span with another to cover both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span contains an offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Get the text covered by this span, clamped to the line
    pub fn slice<'a>(&self, line: &'a str) -> &'a str {
        let end = self.end.min(line.len());
        let start = self.start.min(end);
        line.get(start..end).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Format an error message with the line and a caret under the offending offset.
pub fn format_error(line: &str, span: Span, message: &str) -> String {
    let column = line
        .get(..span.start.min(line.len()))
        .map(|prefix| prefix.chars().count())
        .unwrap_or(0);
    let width = span.slice(line).chars().count().max(1);

    let mut result = String::new();
    result.push_str(&format!("Error: {}\n", message));
    result.push_str(&format!("  | {}\n", line));
    result.push_str(&format!("  | {}{}\n", " ".repeat(column), "^".repeat(width)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice_and_merge() {
        let line = "subsystem=threads:read-resource";
        let span = Span::at(10, 7);
        assert_eq!(span.slice(line), "threads");
        assert_eq!(span.merge(Span::single(0)), Span::new(0, 17));
        assert!(span.contains(10));
        assert!(!span.contains(17));
    }

    #[test]
    fn test_slice_is_clamped() {
        assert_eq!(Span::new(3, 99).slice("abcd"), "d");
        assert_eq!(Span::new(10, 12).slice("abcd"), "");
    }

    #[test]
    fn test_format_error_points_at_offset() {
        let rendered = format_error("a=b/1x=c", Span::at(4, 2), "bad type");
        let caret_line = rendered.lines().last().unwrap_or_default();
        assert_eq!(caret_line, "  |     ^^");
    }
}
