//! AST types for Vue single-file components.
//!
//! The document is split into three segments; the template segment parses to a
//! [`Fragment`] of markup nodes and the style segment to a [`StyleSheet`]. The
//! script segment is handed to an ECMAScript parser by the consumer.

use crate::Span;
use smol_str::SmolStr;

/// The segments of a `.vue` file.
#[derive(Debug, Clone, Default)]
pub struct SfcDocument {
    /// The `<template>` segment.
    pub template: Option<Segment>,
    /// The `<script>` segment.
    pub script: Option<Segment>,
    /// The `<style>` segment.
    pub style: Option<Segment>,
    /// Whether the style tag carries the `scoped` attribute.
    pub style_scoped: bool,
    /// The language declared on the script tag.
    pub script_lang: ScriptLang,
}

impl SfcDocument {
    /// The template source, or the empty string when absent.
    pub fn template_source(&self) -> &str {
        self.template.as_ref().map_or("", |s| s.content.as_str())
    }

    /// The script source, or the empty string when absent.
    pub fn script_source(&self) -> &str {
        self.script.as_ref().map_or("", |s| s.content.as_str())
    }

    /// The style source, or the empty string when absent.
    pub fn style_source(&self) -> &str {
        self.style.as_ref().map_or("", |s| s.content.as_str())
    }
}

/// The raw content of one top-level block.
#[derive(Debug, Clone)]
pub struct Segment {
    /// The text between the opening and closing tags.
    pub content: String,
    /// The span of `content` in the original file.
    pub content_span: Span,
}

/// The language of the script block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptLang {
    /// JavaScript (default).
    #[default]
    JavaScript,
    /// TypeScript (`lang="ts"`).
    TypeScript,
}

// === Markup ===

/// A sequence of sibling markup nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// The nodes in document order.
    pub nodes: Vec<Node>,
    /// The span covered by the fragment.
    pub span: Span,
}

impl Fragment {
    /// Iterates over the element nodes of the fragment.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }
}

/// A markup node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element such as `<div class="a">…</div>`.
    Element(Element),
    /// A run of text, possibly containing `{{ }}` interpolations.
    Text(Text),
    /// An HTML comment.
    Comment(Comment),
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(n) => n.span,
            Node::Text(n) => n.span,
            Node::Comment(n) => n.span,
        }
    }
}

/// A markup element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// The tag name as written.
    pub name: SmolStr,
    /// Attributes in source order; names are unique.
    pub attributes: Vec<Attribute>,
    /// Child nodes in source order.
    pub children: Vec<Node>,
    /// The span of the element including its closing tag.
    pub span: Span,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    /// Adds an attribute, builder style.
    pub fn with_attribute(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Adds a child node, builder style.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the value of an attribute, if it exists and has one.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| a.value.as_deref())
    }

    /// Sets an attribute, replacing the value in place when it already exists.
    pub fn set_attribute(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        let name = name.into();
        let value = Some(value.into());
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name,
                value,
                span: Span::default(),
            }),
        }
    }

    /// Iterates over the child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The attribute name, including any directive prefix (`:`, `@`, `v-`).
    pub name: SmolStr,
    /// The value; `None` for boolean attributes written without `=`.
    pub value: Option<String>,
    /// The span of the whole attribute.
    pub span: Span,
}

/// Text content.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// The raw text.
    pub data: String,
    /// The span of the text.
    pub span: Span,
}

impl Text {
    /// Creates a text node with no span.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            span: Span::default(),
        }
    }

    /// Returns true if the text contains only whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.data.chars().all(char::is_whitespace)
    }
}

/// A comment, in markup or in a style sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// The comment body without its delimiters.
    pub data: String,
    /// The span of the comment including delimiters.
    pub span: Span,
}

// === Style ===

/// A parsed style sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    /// Top-level rules in source order.
    pub rules: Vec<Rule>,
}

/// A top-level or nested style rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A `/* … */` comment between rules.
    Comment(Comment),
    /// A selector list with a declaration block.
    Qualified(QualifiedRule),
    /// An `@`-rule.
    At(AtRule),
}

/// A rule such as `.a, .b { color: red; }`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    /// The comma-separated selectors, trimmed.
    pub selectors: Vec<String>,
    /// The declaration block.
    pub declarations: Vec<DeclarationItem>,
    /// The span of the rule.
    pub span: Span,
}

/// One entry of a declaration block.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationItem {
    /// A `property: value` pair.
    Declaration(Declaration),
    /// A comment inside the block.
    Comment(Comment),
}

/// A `property: value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property name.
    pub property: String,
    /// The value, trimmed, including any `!important`.
    pub value: String,
    /// The span of the declaration.
    pub span: Span,
}

impl Declaration {
    /// Creates a declaration with no span.
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            span: Span::default(),
        }
    }
}

/// An at-rule such as `@media (…) { … }` or `@charset "utf-8";`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// The name without the `@`.
    pub name: SmolStr,
    /// The text between the name and the block or `;`, trimmed.
    pub prelude: String,
    /// The block, absent for statement at-rules.
    pub block: Option<AtRuleBlock>,
    /// The span of the rule.
    pub span: Span,
}

impl AtRule {
    /// Returns true for at-rules whose blocks hold keyframe selectors.
    pub fn is_keyframes(&self) -> bool {
        self.name.ends_with("keyframes")
    }
}

/// The body of an at-rule.
#[derive(Debug, Clone, PartialEq)]
pub enum AtRuleBlock {
    /// Nested rules (`@media`, `@supports`, `@keyframes`).
    Rules(Vec<Rule>),
    /// Declarations (`@font-face`, `@page`).
    Declarations(Vec<DeclarationItem>),
}

/// At-rules whose block holds declarations rather than rules.
const DECLARATION_AT_RULES: &[&str] = &["font-face", "page", "viewport", "counter-style", "property"];

/// Returns true if the at-rule `name` takes a declaration block.
pub(crate) fn at_rule_takes_declarations(name: &str) -> bool {
    DECLARATION_AT_RULES.contains(&name.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut el = Element::new("view")
            .with_attribute("a", "1")
            .with_attribute("b", "2");
        el.set_attribute("a", "3");
        let names: Vec<_> = el.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(el.attribute_value("a"), Some("3"));
    }

    #[test]
    fn test_declaration_at_rules() {
        assert!(at_rule_takes_declarations("font-face"));
        assert!(!at_rule_takes_declarations("media"));
    }
}
