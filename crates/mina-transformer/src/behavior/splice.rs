//! Span-directed text editing.
//!
//! Edits replace a byte range of the original script with a list of pieces,
//! where a piece is either new text or another range of the original. Source
//! pieces are rendered with the edits nested inside them, so an edit can move
//! a subtree and still carry the rewrites made within it.

use std::ops::Range;

/// One part of a replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    /// Literal text.
    Text(String),
    /// A range of the original source, with its nested edits applied.
    Source(Range<usize>),
    /// Like `Source`, with up to `width` columns of indentation removed from
    /// every line after the first.
    Dedented(Range<usize>, usize),
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Piece::Text(text.to_string())
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Piece::Text(text)
    }
}

#[derive(Debug, Clone)]
struct Edit {
    range: Range<usize>,
    pieces: Vec<Piece>,
}

impl Edit {
    fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

/// Collects edits against a source text and renders the result.
pub(crate) struct Splicer<'src> {
    source: &'src str,
    edits: Vec<Edit>,
}

impl<'src> Splicer<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// Replaces `range` with `pieces`.
    pub(crate) fn replace(&mut self, range: Range<usize>, pieces: Vec<Piece>) {
        self.edits.push(Edit { range, pieces });
    }

    /// Inserts text at `offset`.
    pub(crate) fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(offset..offset, vec![Piece::Text(text.into())]);
    }

    /// Deletes `range`.
    pub(crate) fn remove(&mut self, range: Range<usize>) {
        self.replace(range, Vec::new());
    }

    /// Renders the whole source with every edit applied.
    ///
    /// Where edits overlap, the one that starts first (or, for equal starts,
    /// the longest) wins and the others inside it only apply through its
    /// source pieces.
    pub(crate) fn finish(mut self) -> String {
        self.edits.sort_by_key(|e| {
            (
                e.range.start,
                !e.is_insert(),
                std::cmp::Reverse(e.range.end),
            )
        });
        let mut out = String::with_capacity(self.source.len());
        self.render(&mut out, 0..self.source.len(), None, true);
        out
    }

    /// Renders `range`, applying the edits inside it except `skip`.
    ///
    /// Insertions on the boundary of a source piece belong to the enclosing
    /// text, so nested renders only take the ones strictly inside.
    fn render(&self, out: &mut String, range: Range<usize>, skip: Option<usize>, root: bool) {
        let mut cursor = range.start;

        for (index, edit) in self.edits.iter().enumerate() {
            let Range { start, end } = edit.range;
            if start > range.end {
                break;
            }
            if Some(index) == skip || start < cursor || end > range.end {
                continue;
            }
            if !root && edit.is_insert() && (start == range.start || start == range.end) {
                continue;
            }

            out.push_str(&self.source[cursor..edit.range.start]);
            for piece in &edit.pieces {
                match piece {
                    Piece::Text(text) => out.push_str(text),
                    Piece::Source(inner) => self.render(out, inner.clone(), Some(index), false),
                    Piece::Dedented(inner, width) => {
                        let mut buf = String::new();
                        self.render(&mut buf, inner.clone(), Some(index), false);
                        out.push_str(&dedent(&buf, *width));
                    }
                }
            }
            cursor = edit.range.end;
        }

        if cursor < range.end {
            out.push_str(&self.source[cursor..range.end]);
        }
    }
}

/// Removes up to `width` leading spaces or tabs from every line but the first.
pub(crate) fn dedent(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        let strip = line
            .bytes()
            .take(width)
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        out.push_str(&line[strip..]);
    }
    out
}
