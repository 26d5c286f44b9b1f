//! Byte spans into the component source.

use std::ops::Range;
use text_size::TextSize;

/// A half-open byte range `[start, end)` into a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: TextSize,
    /// The end byte offset (exclusive).
    pub end: TextSize,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<TextSize>, end: impl Into<TextSize>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` offsets.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    /// Creates an empty span at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<TextSize>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Moves the span forward by `base`.
    ///
    /// Segments are parsed on their own, so spans produced for a segment are
    /// shifted by the segment's start offset to address the whole file.
    #[inline]
    pub fn shifted(self, base: TextSize) -> Span {
        Span {
            start: self.start + base,
            end: self.end + base,
        }
    }

    /// Returns the span as a `usize` range for slicing.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        u32::from(self.start) as usize..u32::from(self.end) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shifted() {
        let span = Span::from_offsets(2, 5).shifted(TextSize::from(10));
        assert_eq!(span.range(), 12..15);
        assert_eq!(u32::from(span.len()), 3);
    }

    #[test]
    fn test_empty() {
        let span = Span::empty(TextSize::from(4));
        assert!(span.is_empty());
        assert_eq!(span.range(), 4..4);
    }
}
