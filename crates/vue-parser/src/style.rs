//! Style sheet parser.
//!
//! A cursor over the source that understands comments, strings, blocks and
//! at-rules. Selector and value text is kept verbatim (trimmed) since the
//! transformer only rewrites class tokens and unit tokens inside them.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::{Span, StyleParseResult};
use smol_str::SmolStr;

pub(crate) struct StyleParser<'src> {
    source: &'src str,
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'src> StyleParser<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> StyleParseResult {
        let rules = self.parse_rules(None);
        StyleParseResult {
            sheet: StyleSheet { rules },
            errors: self.errors,
        }
    }

    // === Cursor helpers ===

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.source.len() - trimmed.len();
    }

    fn error_at(&mut self, kind: ParseErrorKind, start: usize, end: usize) {
        self.errors
            .push(ParseError::new(kind, Span::from_offsets(start, end)));
    }

    /// Scans forward from the cursor to the first of `stops` that is not
    /// nested in parentheses, brackets, strings or comments. Returns the
    /// offset of the stop character, or the end of input.
    fn scan_until(&self, stops: &[char]) -> usize {
        let bytes = self.source.as_bytes();
        let mut i = self.pos;
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;

        while i < bytes.len() {
            let b = bytes[i];
            if let Some(q) = quote {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            match b {
                b'"' | b'\'' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = self.source[i + 2..]
                        .find("*/")
                        .map_or(bytes.len(), |p| i + 2 + p + 2);
                    continue;
                }
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                _ if depth == 0 && stops.contains(&(b as char)) => return i,
                _ => {}
            }
            i += 1;
        }

        bytes.len()
    }

    // === Rules ===

    /// Parses rules until end of input, or until the `}` closing the block
    /// opened by `context`.
    fn parse_rules(&mut self, context: Option<&str>) -> Vec<Rule> {
        let mut rules = Vec::new();

        loop {
            self.skip_whitespace();
            if self.at_end() {
                if let Some(context) = context {
                    let end = self.source.len();
                    self.error_at(
                        ParseErrorKind::UnclosedBlock {
                            context: context.to_string(),
                        },
                        end,
                        end,
                    );
                }
                break;
            }

            if self.rest().starts_with("/*") {
                if let Some(comment) = self.parse_comment() {
                    rules.push(Rule::Comment(comment));
                }
                continue;
            }

            match self.peek() {
                Some('}') => {
                    let start = self.pos;
                    self.pos += 1;
                    if context.is_some() {
                        break;
                    }
                    self.error_at(
                        ParseErrorKind::UnexpectedToken {
                            expected: "selector or at-rule".to_string(),
                            found: "'}'".to_string(),
                        },
                        start,
                        start + 1,
                    );
                }
                Some('@') => rules.push(self.parse_at_rule()),
                _ => {
                    if let Some(rule) = self.parse_qualified_rule() {
                        rules.push(Rule::Qualified(rule));
                    }
                }
            }
        }

        rules
    }

    fn parse_comment(&mut self) -> Option<Comment> {
        let start = self.pos;
        let body_start = start + 2;
        match self.source[body_start..].find("*/") {
            Some(len) => {
                self.pos = body_start + len + 2;
                Some(Comment {
                    data: self.source[body_start..body_start + len].to_string(),
                    span: Span::from_offsets(start, self.pos),
                })
            }
            None => {
                self.pos = self.source.len();
                self.error_at(ParseErrorKind::UnclosedComment, start, self.pos);
                None
            }
        }
    }

    fn parse_qualified_rule(&mut self) -> Option<QualifiedRule> {
        let start = self.pos;
        let brace = self.scan_until(&['{', '}', ';']);
        let prelude = self.source[start..brace].trim();

        if self.source.as_bytes().get(brace) != Some(&b'{') {
            // Either garbage before a `;`/`}` or a selector with no block.
            self.error_at(
                ParseErrorKind::UnexpectedToken {
                    expected: "'{'".to_string(),
                    found: if brace >= self.source.len() {
                        "end of input".to_string()
                    } else {
                        format!("'{}'", &self.source[brace..brace + 1])
                    },
                },
                start,
                brace,
            );
            self.pos = if self.source.as_bytes().get(brace) == Some(&b';') {
                brace + 1
            } else {
                brace
            };
            return None;
        }

        let selectors = split_selectors(prelude);
        self.pos = brace + 1;
        let declarations = self.parse_declarations(prelude);

        Some(QualifiedRule {
            selectors,
            declarations,
            span: Span::from_offsets(start, self.pos),
        })
    }

    fn parse_at_rule(&mut self) -> Rule {
        let start = self.pos;
        self.pos += 1;
        let name_len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(self.rest().len());
        let name = SmolStr::new(&self.rest()[..name_len]);
        self.pos += name_len;

        let stop = self.scan_until(&['{', ';', '}']);
        let prelude = self.source[self.pos..stop].trim().to_string();
        let context = format!("@{name}");

        let block = match self.source.as_bytes().get(stop) {
            Some(b'{') => {
                self.pos = stop + 1;
                Some(if at_rule_takes_declarations(&name) {
                    AtRuleBlock::Declarations(self.parse_declarations(&context))
                } else {
                    AtRuleBlock::Rules(self.parse_rules(Some(&context)))
                })
            }
            Some(b';') => {
                self.pos = stop + 1;
                None
            }
            _ => {
                // `}` of an enclosing block or end of input: leave it for the caller.
                self.pos = stop;
                None
            }
        };

        Rule::At(AtRule {
            name,
            prelude,
            block,
            span: Span::from_offsets(start, self.pos),
        })
    }

    /// Parses declarations after an opening `{` up to and including its `}`.
    fn parse_declarations(&mut self, context: &str) -> Vec<DeclarationItem> {
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            if self.at_end() {
                let end = self.source.len();
                self.error_at(
                    ParseErrorKind::UnclosedBlock {
                        context: context.to_string(),
                    },
                    end,
                    end,
                );
                break;
            }

            if self.rest().starts_with("/*") {
                if let Some(comment) = self.parse_comment() {
                    items.push(DeclarationItem::Comment(comment));
                }
                continue;
            }

            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(';') => {
                    self.pos += 1;
                }
                _ => {
                    if let Some(declaration) = self.parse_declaration() {
                        items.push(DeclarationItem::Declaration(declaration));
                    }
                }
            }
        }

        items
    }

    fn parse_declaration(&mut self) -> Option<Declaration> {
        let start = self.pos;
        let colon = self.scan_until(&[':', ';', '}', '{']);

        if self.source.as_bytes().get(colon) != Some(&b':') {
            let end = if self.source.as_bytes().get(colon) == Some(&b';') {
                colon + 1
            } else {
                colon
            };
            self.error_at(
                ParseErrorKind::InvalidDeclaration {
                    message: format!(
                        "expected ':' after `{}`",
                        self.source[start..colon].trim()
                    ),
                },
                start,
                colon,
            );
            // Skip a nested block so its `}` does not close ours.
            if self.source.as_bytes().get(colon) == Some(&b'{') {
                self.pos = colon + 1;
                self.parse_declarations("nested block");
            } else {
                self.pos = end;
            }
            return None;
        }

        let property = self.source[start..colon].trim().to_string();
        self.pos = colon + 1;
        let value_end = self.scan_until(&[';', '}']);
        let value = self.source[self.pos..value_end].trim().to_string();
        self.pos = value_end;
        if self.peek() == Some(';') {
            self.pos += 1;
        }

        Some(Declaration {
            property,
            value,
            span: Span::from_offsets(start, value_end),
        })
    }
}

/// Splits a selector list on top-level commas.
fn split_selectors(prelude: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut current = String::new();

    for ch in prelude.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                selectors.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    selectors.push(current);

    selectors
        .into_iter()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect()
}
