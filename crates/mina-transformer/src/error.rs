//! Transformation errors.

use thiserror::Error;
use vue_parser::{ParseError, Span, TextSize};

/// Which segment of the component an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// The `<template>` block.
    Template,
    /// The `<script>` block.
    Script,
    /// The `<style>` block.
    Style,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SegmentKind::Template => "template",
            SegmentKind::Script => "script",
            SegmentKind::Style => "style",
        })
    }
}

/// An error that stops a component from being converted.
///
/// Spans address the whole `.vue` file once the error leaves [`crate::transform`].
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The template or style segment did not parse.
    #[error("failed to parse {segment}: {}", errors.first().map(ToString::to_string).unwrap_or_default())]
    Parse {
        /// The segment that failed.
        segment: SegmentKind,
        /// Every error reported by the parser.
        errors: Vec<ParseError>,
    },

    /// The script did not parse.
    #[error("failed to parse script: {message}")]
    ScriptParse {
        /// The parser's message.
        message: String,
        /// Where the parser stopped.
        span: Span,
    },

    /// The script has no `export default`.
    #[error("script has no `export default` component descriptor")]
    MissingDefaultExport,

    /// The default export is not an object literal.
    #[error("the default export must be an object literal")]
    DescriptorNotObject {
        /// The exported expression.
        span: Span,
    },

    /// `data` is not a function that only returns an object literal.
    #[error("`data` must be an object or a function that only returns an object literal")]
    InvalidData {
        /// The `data` property.
        span: Span,
    },

    /// `methods`, `computed` or `filters` is not an object literal.
    #[error("`{section}` must be an object literal")]
    InvalidSection {
        /// The section name.
        section: String,
        /// The section value.
        span: Span,
    },

    /// A `v-for` value that is not `item in list`.
    #[error("invalid `v-for` expression `{value}`")]
    InvalidLoop {
        /// The attribute value.
        value: String,
        /// The attribute.
        span: Span,
    },

    /// A configured pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl TransformError {
    /// The primary location of the error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            TransformError::Parse { errors, .. } => errors.first().map(|e| e.span),
            TransformError::ScriptParse { span, .. }
            | TransformError::DescriptorNotObject { span }
            | TransformError::InvalidData { span }
            | TransformError::InvalidSection { span, .. }
            | TransformError::InvalidLoop { span, .. } => Some(*span),
            TransformError::MissingDefaultExport | TransformError::Pattern(_) => None,
        }
    }

    /// Moves every span forward by `base`, the start of the segment.
    pub(crate) fn shifted(self, base: TextSize) -> Self {
        match self {
            TransformError::Parse { segment, errors } => TransformError::Parse {
                segment,
                errors: errors.into_iter().map(|e| e.shifted(base)).collect(),
            },
            TransformError::ScriptParse { message, span } => TransformError::ScriptParse {
                message,
                span: span.shifted(base),
            },
            TransformError::DescriptorNotObject { span } => TransformError::DescriptorNotObject {
                span: span.shifted(base),
            },
            TransformError::InvalidData { span } => TransformError::InvalidData {
                span: span.shifted(base),
            },
            TransformError::InvalidSection { section, span } => TransformError::InvalidSection {
                section,
                span: span.shifted(base),
            },
            TransformError::InvalidLoop { value, span } => TransformError::InvalidLoop {
                value,
                span: span.shifted(base),
            },
            other => other,
        }
    }
}
