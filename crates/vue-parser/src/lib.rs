//! Vue single-file component parser for vue2mina.
//!
//! This crate provides:
//! - Segment extraction for `<template>`, `<script>` and `<style>` blocks
//! - A `logos` lexer and recursive descent parser for template markup
//! - A style sheet parser for rules, declarations and at-rules
//! - Error recovery, so a partial tree is always returned with its errors
//!
//! The script segment is not parsed here; consumers hand it to an
//! ECMAScript parser.
//!
//! # Example
//!
//! ```
//! use vue_parser::{extract_segments, parse_markup, parse_stylesheet};
//!
//! let source = r#"
//! <template><div class="box">{{ title }}</div></template>
//! <style scoped>.box { width: 1rem; }</style>
//! "#;
//!
//! let doc = extract_segments(source);
//! let markup = parse_markup(doc.template_source());
//! let style = parse_stylesheet(doc.style_source());
//! assert!(markup.errors.is_empty() && style.errors.is_empty());
//! assert!(doc.style_scoped);
//! ```

mod ast;
mod error;
mod lexer;
mod markup;
mod sfc;
mod span;
mod style;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use sfc::extract_segments;
pub use span::Span;
pub use text_size::TextSize;

/// The result of parsing template markup.
#[derive(Debug)]
pub struct MarkupParseResult {
    /// The parsed nodes.
    pub fragment: Fragment,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// The result of parsing a style sheet.
#[derive(Debug)]
pub struct StyleParseResult {
    /// The parsed rules.
    pub sheet: StyleSheet,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses template markup into a fragment.
///
/// Spans are relative to `source`; use [`ParseError::shifted`] to move
/// errors into file coordinates.
pub fn parse_markup(source: &str) -> MarkupParseResult {
    let result = markup::MarkupParser::new(source).parse();
    log::debug!(
        "parsed markup: {} top-level node(s), {} error(s)",
        result.fragment.nodes.len(),
        result.errors.len()
    );
    result
}

/// Parses a style sheet.
pub fn parse_stylesheet(source: &str) -> StyleParseResult {
    let result = style::StyleParser::new(source).parse();
    log::debug!(
        "parsed style sheet: {} rule(s), {} error(s)",
        result.sheet.rules.len(),
        result.errors.len()
    );
    result
}
