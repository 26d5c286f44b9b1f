//! Parse error types.

use crate::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the same error with its span moved forward by `base`.
    pub fn shifted(self, base: text_size::TextSize) -> Self {
        Self {
            kind: self.kind,
            span: self.span.shifted(base),
        }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, Error)]
pub enum ParseErrorKind {
    /// An unexpected token was encountered.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// An unexpected end of input was encountered.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// An element was never closed.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
    },

    /// A closing tag did not match the open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        /// The expected tag name.
        expected: String,
        /// The found tag name.
        found: String,
    },

    /// A closing tag appeared with no open element.
    #[error("unexpected closing tag: </{tag_name}>")]
    UnexpectedClosingTag {
        /// The name of the stray closing tag.
        tag_name: String,
    },

    /// The same attribute appeared twice on one element.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The name of the duplicated attribute.
        name: String,
    },

    /// A `<` was not followed by a tag name.
    #[error("invalid tag name: {name}")]
    InvalidTagName {
        /// The text found in place of a tag name.
        name: String,
    },

    /// A `<!--` or `/*` comment was never closed.
    #[error("unclosed comment")]
    UnclosedComment,

    /// A `{` block in a style sheet was never closed.
    #[error("unclosed block in {context}")]
    UnclosedBlock {
        /// What the block belongs to (a selector or at-rule).
        context: String,
    },

    /// A style declaration could not be read.
    #[error("invalid declaration: {message}")]
    InvalidDeclaration {
        /// A description of the problem.
        message: String,
    },
}
