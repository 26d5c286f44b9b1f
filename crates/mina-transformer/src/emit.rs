//! Text rendering of transformed markup and style sheets.

use crate::markup::MarkupOutput;
use crate::style::StyleOutput;
use std::fmt::Write;
use vue_parser::{AtRule, AtRuleBlock, DeclarationItem, Element, Node, Rule};

const INDENT: &str = "  ";

/// Renders `.wxml` text: import lines, a blank line, then the markup.
pub fn render_markup(output: &MarkupOutput) -> String {
    let mut out = String::new();
    if !output.imports.is_empty() {
        out.push_str(&output.imports.join("\n"));
        out.push_str("\n\n");
    }
    for node in &output.fragment.nodes {
        render_node(&mut out, node, 0);
    }
    out
}

fn render_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Element(el) => render_element(out, el, depth),
        Node::Text(text) => {
            let data = text.data.trim();
            if !data.is_empty() {
                push_line(out, depth, data);
            }
        }
        Node::Comment(comment) => push_line(out, depth, &format!("<!--{}-->", comment.data)),
    }
}

fn render_element(out: &mut String, el: &Element, depth: usize) {
    let mut open = format!("<{}", el.name);
    for attr in &el.attributes {
        match &attr.value {
            Some(value) => {
                let _ = write!(open, " {}=\"{}\"", attr.name, escape_attribute(value));
            }
            None => {
                let _ = write!(open, " {}", attr.name);
            }
        }
    }

    let visible: Vec<&Node> = el
        .children
        .iter()
        .filter(|n| !matches!(n, Node::Text(t) if t.is_whitespace()))
        .collect();

    match visible.as_slice() {
        [] => push_line(out, depth, &format!("{open} />")),
        // A lone text child stays on the element's line.
        [Node::Text(text)] => push_line(
            out,
            depth,
            &format!("{open}>{}</{}>", text.data.trim(), el.name),
        ),
        children => {
            push_line(out, depth, &format!("{open}>"));
            for child in children {
                render_node(out, child, depth + 1);
            }
            push_line(out, depth, &format!("</{}>", el.name));
        }
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Renders `.wxss` text: import lines, a blank line, then the rules.
pub fn render_stylesheet(output: &StyleOutput) -> String {
    let mut out = String::new();
    if !output.imports.is_empty() {
        out.push_str(&output.imports.join("\n"));
        out.push_str("\n\n");
    }
    render_rules(&mut out, &output.sheet.rules, 0);
    out
}

fn render_rules(out: &mut String, rules: &[Rule], depth: usize) {
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match rule {
            Rule::Comment(comment) => push_line(out, depth, &format!("/*{}*/", comment.data)),
            Rule::Qualified(rule) => {
                let pad = INDENT.repeat(depth);
                let selectors = rule.selectors.join(&format!(",\n{pad}"));
                push_line(out, depth, &format!("{selectors} {{"));
                render_declarations(out, &rule.declarations, depth + 1);
                push_line(out, depth, "}");
            }
            Rule::At(at) => render_at_rule(out, at, depth),
        }
    }
}

fn render_at_rule(out: &mut String, at: &AtRule, depth: usize) {
    let head = if at.prelude.is_empty() {
        format!("@{}", at.name)
    } else {
        format!("@{} {}", at.name, at.prelude)
    };

    match &at.block {
        None => push_line(out, depth, &format!("{head};")),
        Some(AtRuleBlock::Rules(rules)) => {
            push_line(out, depth, &format!("{head} {{"));
            render_rules(out, rules, depth + 1);
            push_line(out, depth, "}");
        }
        Some(AtRuleBlock::Declarations(items)) => {
            push_line(out, depth, &format!("{head} {{"));
            render_declarations(out, items, depth + 1);
            push_line(out, depth, "}");
        }
    }
}

fn render_declarations(out: &mut String, items: &[DeclarationItem], depth: usize) {
    for item in items {
        match item {
            DeclarationItem::Declaration(decl) => {
                push_line(out, depth, &format!("{}: {};", decl.property, decl.value))
            }
            DeclarationItem::Comment(comment) => {
                push_line(out, depth, &format!("/*{}*/", comment.data))
            }
        }
    }
}
