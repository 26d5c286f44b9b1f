//! Splitting a `.vue` file into its template, script and style segments.

use crate::ast::{ScriptLang, Segment, SfcDocument};
use crate::Span;

/// Splits a single-file component into its three segments.
///
/// The template segment runs from the first `<template>` to the last
/// `</template>` so nested `<template>` elements stay inside it. Script and
/// style use the first occurrence of their tags. Missing blocks yield `None`.
pub fn extract_segments(source: &str) -> SfcDocument {
    let mut doc = SfcDocument::default();

    if let Some(block) = find_block(source, "template", true) {
        doc.template = Some(block.segment);
    }

    if let Some(block) = find_block(source, "script", false) {
        if matches!(block.attribute("lang"), Some("ts" | "typescript")) {
            doc.script_lang = ScriptLang::TypeScript;
        }
        doc.script = Some(block.segment);
    }

    if let Some(block) = find_block(source, "style", false) {
        doc.style_scoped = block.has_attribute("scoped");
        doc.style = Some(block.segment);
    }

    log::trace!(
        "segments: template={} script={} style={} scoped={}",
        doc.template.is_some(),
        doc.script.is_some(),
        doc.style.is_some(),
        doc.style_scoped
    );
    doc
}

/// A located top-level block.
struct Block<'src> {
    segment: Segment,
    /// The raw attribute text of the opening tag.
    attributes: &'src str,
}

impl Block<'_> {
    fn has_attribute(&self, name: &str) -> bool {
        tag_attributes(self.attributes).any(|(n, _)| n == name)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        tag_attributes(self.attributes)
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v)
    }
}

/// Splits the attribute text of an opening tag into name/value pairs.
fn tag_attributes(raw: &str) -> impl Iterator<Item = (&str, Option<&str>)> {
    raw.split_whitespace().map(|pair| match pair.split_once('=') {
        Some((name, value)) => (name, Some(value.trim_matches(|c| c == '"' || c == '\''))),
        None => (pair, None),
    })
}

fn find_block<'src>(source: &'src str, tag: &str, outermost: bool) -> Option<Block<'src>> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut search_from = 0;
    let open_start = loop {
        let idx = search_from + source[search_from..].find(&open)?;
        let after = source[idx + open.len()..].chars().next();
        // `<templates>` or `<style-guide>` must not match.
        if matches!(after, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            break idx;
        }
        search_from = idx + open.len();
    };

    let attrs_start = open_start + open.len();
    let content_start = attrs_start + source[attrs_start..].find('>')? + 1;
    let attributes = source[attrs_start..content_start - 1].trim_end_matches('/');

    let content_end = if outermost {
        source.rfind(&close)
    } else {
        source[content_start..].find(&close).map(|i| i + content_start)
    }
    .filter(|end| *end >= content_start)?;

    Some(Block {
        segment: Segment {
            content: source[content_start..content_end].to_string(),
            content_span: Span::from_offsets(content_start, content_end),
        },
        attributes,
    })
}
