//! Binding expression grammar.
//!
//! Directive values and `{{ }}` interpolations are parsed once into small
//! typed forms. Expressions themselves stay opaque text; only the top-level
//! filter pipes and loop headers are split out.

use std::fmt;

/// A piece of an attribute value or text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpolationPart {
    /// Plain text.
    Literal(String),
    /// The inside of a `{{ }}` pair, untrimmed.
    Moustache(String),
}

/// Text split into literal runs and `{{ }}` interpolations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Interpolation {
    /// The parts in source order.
    pub parts: Vec<InterpolationPart>,
}

impl Interpolation {
    /// Splits `text` at `{{` / `}}` pairs. An unterminated `{{` is literal.
    pub fn parse(text: &str) -> Self {
        let mut parts = Vec::new();
        let mut rest = text;

        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open + 2..].find("}}") else {
                break;
            };
            if open > 0 {
                parts.push(InterpolationPart::Literal(rest[..open].to_string()));
            }
            let inner = &rest[open + 2..open + 2 + close];
            parts.push(InterpolationPart::Moustache(inner.to_string()));
            rest = &rest[open + 2 + close + 2..];
        }

        if !rest.is_empty() {
            parts.push(InterpolationPart::Literal(rest.to_string()));
        }

        Self { parts }
    }

    /// Returns true if any part is an interpolation.
    pub fn has_moustache(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, InterpolationPart::Moustache(_)))
    }

    /// Renders the text with filter pipes turned into calls.
    ///
    /// Interpolations without filters are written back unchanged.
    pub fn render_filters(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                InterpolationPart::Literal(text) => out.push_str(text),
                InterpolationPart::Moustache(inner) => {
                    let expr = BindingExpr::parse(inner);
                    out.push_str("{{");
                    if expr.filters.is_empty() {
                        out.push_str(inner);
                    } else {
                        out.push_str(&expr.to_string());
                    }
                    out.push_str("}}");
                }
            }
        }
        out
    }
}

/// Rewrites every filtered interpolation in `text`.
pub fn rewrite_filters(text: &str) -> String {
    let interpolation = Interpolation::parse(text);
    if !interpolation.has_moustache() {
        return text.to_string();
    }
    interpolation.render_filters()
}

/// A filter applied with `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCall {
    /// The filter name.
    pub name: String,
    /// Extra arguments written as `name(args)`.
    pub args: Option<String>,
}

/// An expression followed by zero or more filters: `value | f | g(x)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingExpr {
    /// The piped expression, trimmed.
    pub expr: String,
    /// Filters in application order.
    pub filters: Vec<FilterCall>,
}

impl BindingExpr {
    /// Parses a binding expression. `||` is never a pipe.
    pub fn parse(source: &str) -> Self {
        let mut segments = split_pipes(source).into_iter();
        let expr = segments.next().unwrap_or_default().trim().to_string();
        let filters = segments
            .map(|segment| {
                let segment = segment.trim();
                match segment.find('(') {
                    Some(paren) if segment.ends_with(')') => FilterCall {
                        name: segment[..paren].trim().to_string(),
                        args: Some(segment[paren + 1..segment.len() - 1].trim().to_string()),
                    },
                    _ => FilterCall {
                        name: segment.to_string(),
                        args: None,
                    },
                }
            })
            .collect();

        Self { expr, filters }
    }
}

impl fmt::Display for BindingExpr {
    /// Writes the expression with filters nested as calls, innermost first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.filters.iter().fold(self.expr.clone(), |acc, filter| {
            match filter.args.as_deref() {
                Some(args) if !args.is_empty() => format!("{}({acc}, {args})", filter.name),
                _ => format!("{}({acc})", filter.name),
            }
        });
        f.write_str(&rendered)
    }
}

/// Splits on single `|` outside strings and brackets.
fn split_pipes(source: &str) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'|' if depth == 0 => {
                if bytes.get(i + 1) == Some(&b'|') {
                    i += 2;
                    continue;
                }
                segments.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&source[start..]);
    segments
}

/// The header of a `v-for` loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSpec {
    /// The item alias.
    pub item: String,
    /// The index alias, when one is written.
    pub index: Option<String>,
    /// The iterated expression.
    pub list: String,
}

impl LoopSpec {
    /// Parses `item in list`, `(item, index) in list` or the `of` forms.
    pub fn parse(source: &str) -> Option<Self> {
        let (aliases, list) = split_loop_keyword(source)?;
        let aliases = aliases.trim();
        let aliases = aliases
            .strip_prefix('(')
            .and_then(|a| a.strip_suffix(')'))
            .unwrap_or(aliases);

        let mut names = aliases.split(',').map(str::trim);
        let item = names.next().filter(|n| !n.is_empty())?.to_string();
        let index = names.next().filter(|n| !n.is_empty()).map(str::to_string);
        let list = list.trim();
        if list.is_empty() {
            return None;
        }

        Some(Self {
            item,
            index,
            list: list.to_string(),
        })
    }
}

/// Splits at the first whitespace-delimited `in` or `of`.
fn split_loop_keyword(source: &str) -> Option<(&str, &str)> {
    let bytes = source.as_bytes();
    (1..bytes.len().saturating_sub(2)).find_map(|i| {
        let keyword = &bytes[i..i + 2];
        let bounded = bytes[i - 1].is_ascii_whitespace() && bytes[i + 2].is_ascii_whitespace();
        (bounded && (keyword == b"in" || keyword == b"of"))
            .then(|| (&source[..i], &source[i + 2..]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_filter() {
        assert_eq!(rewrite_filters("{{price | currency}}"), "{{currency(price)}}");
    }

    #[test]
    fn test_chained_filters_nest_left_to_right() {
        assert_eq!(rewrite_filters("{{ a | f | g }}"), "{{g(f(a))}}");
    }

    #[test]
    fn test_filter_arguments_follow_value() {
        assert_eq!(rewrite_filters("{{a | fixed(2)}}"), "{{fixed(a, 2)}}");
    }

    #[test]
    fn test_logical_or_is_not_a_pipe() {
        assert_eq!(rewrite_filters("{{ a || b }}"), "{{ a || b }}");
        let expr = BindingExpr::parse("a || b | f");
        assert_eq!(expr.expr, "a || b");
        assert_eq!(expr.to_string(), "f(a || b)");
    }

    #[test]
    fn test_pipe_inside_string_is_ignored() {
        assert_eq!(rewrite_filters("{{ 'a|b' }}"), "{{ 'a|b' }}");
    }

    #[test]
    fn test_text_around_interpolations_is_kept() {
        assert_eq!(
            rewrite_filters("Total: {{n | num}} items, {{ done }}"),
            "Total: {{num(n)}} items, {{ done }}"
        );
    }

    #[test]
    fn test_unterminated_moustache_is_literal() {
        let interp = Interpolation::parse("a {{ b");
        assert!(!interp.has_moustache());
        assert_eq!(interp.render_filters(), "a {{ b");
    }

    #[test]
    fn test_loop_with_index() {
        assert_eq!(
            LoopSpec::parse("(item, idx) in list"),
            Some(LoopSpec {
                item: "item".into(),
                index: Some("idx".into()),
                list: "list".into(),
            })
        );
    }

    #[test]
    fn test_loop_without_index_and_of_keyword() {
        let loop_spec = LoopSpec::parse("user of users.active").unwrap();
        assert_eq!(loop_spec.item, "user");
        assert_eq!(loop_spec.index, None);
        assert_eq!(loop_spec.list, "users.active");
    }

    #[test]
    fn test_loop_alias_containing_keyword_letters() {
        let loop_spec = LoopSpec::parse("info in infos").unwrap();
        assert_eq!(loop_spec.item, "info");
        assert_eq!(loop_spec.list, "infos");
    }

    #[test]
    fn test_malformed_loop() {
        assert_eq!(LoopSpec::parse("items"), None);
        assert_eq!(LoopSpec::parse(" in list"), None);
    }
}
