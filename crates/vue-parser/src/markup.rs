//! Recursive descent parser for template markup.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{MarkupParseResult, Span};
use smol_str::SmolStr;
use text_size::TextSize;

/// HTML void elements that never have closing tags.
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Returns true if the given element name is an HTML void element.
fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS.contains(&name.to_lowercase().as_str())
}

/// The markup parser.
pub(crate) struct MarkupParser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token stream.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Errors collected during parsing.
    errors: Vec<ParseError>,
    /// EOF token for when we're past the end.
    eof_token: Token,
}

impl<'src> MarkupParser<'src> {
    /// Creates a new parser.
    pub(crate) fn new(source: &'src str) -> Self {
        let tokens: Vec<Token> = Lexer::new(source).collect();
        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
            eof_token,
        }
    }

    /// Parses the source into a fragment.
    pub(crate) fn parse(mut self) -> MarkupParseResult {
        let mut nodes = Vec::new();

        while !self.check(TokenKind::Eof) {
            if self.check(TokenKind::LAngleSlash) {
                self.skip_stray_closing_tag();
                continue;
            }
            match self.parse_node() {
                Some(node) => nodes.push(node),
                None => self.advance(),
            }
        }

        MarkupParseResult {
            fragment: Fragment {
                nodes,
                span: Span::from_offsets(0, self.source.len()),
            },
            errors: self.errors,
        }
    }

    // === Token helpers ===

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_text(&self) -> &'src str {
        &self.source[self.current().span.range()]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(ParseErrorKind::UnexpectedToken {
                expected: kind.name().to_string(),
                found: self.current_kind().name().to_string(),
            });
            false
        }
    }

    fn error(&mut self, kind: ParseErrorKind) {
        self.errors.push(ParseError::new(kind, self.current().span));
    }

    /// End offset of the most recently consumed token.
    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.range().end)
            .unwrap_or(0)
    }

    /// Advances past every token that starts before `offset`.
    fn skip_to(&mut self, offset: usize) {
        while !self.check(TokenKind::Eof) && self.current().span.range().start < offset {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    // === Nodes ===

    fn parse_node(&mut self) -> Option<Node> {
        match self.current_kind() {
            TokenKind::CommentOpen => Some(self.parse_comment()),
            TokenKind::LAngle => self.parse_element().or_else(|| self.parse_text()),
            TokenKind::Eof | TokenKind::LAngleSlash => None,
            _ => self.parse_text(),
        }
    }

    fn parse_comment(&mut self) -> Node {
        let start = self.current().span.range().start;
        let content_start = start + "<!--".len();
        let remaining = &self.source[content_start..];

        let (data, end) = match remaining.find("-->") {
            Some(pos) => (remaining[..pos].to_string(), content_start + pos + 3),
            None => {
                self.error(ParseErrorKind::UnclosedComment);
                (remaining.to_string(), self.source.len())
            }
        };

        self.skip_to(end);
        Node::Comment(Comment {
            data,
            span: Span::from_offsets(start, end),
        })
    }

    /// Reads text from the end of the previous token up to the next tag.
    ///
    /// A `<` inside a `{{ }}` interpolation does not end the text.
    fn parse_text(&mut self) -> Option<Node> {
        let start = if self.check(TokenKind::LAngle) {
            // A `<` that did not open a tag is literal text.
            self.current().span.range().start
        } else {
            self.previous_end()
        };
        let bytes = self.source.as_bytes();
        let mut end = if self.check(TokenKind::LAngle) {
            start + 1
        } else {
            start
        };
        let mut in_interpolation = false;

        while end < bytes.len() {
            if in_interpolation {
                if bytes[end..].starts_with(b"}}") {
                    in_interpolation = false;
                    end += 2;
                    continue;
                }
            } else if bytes[end..].starts_with(b"{{") {
                in_interpolation = true;
                end += 2;
                continue;
            } else if bytes[end] == b'<' {
                break;
            }
            end += 1;
        }

        if end <= start {
            return None;
        }

        self.skip_to(end);
        Some(Node::Text(Text {
            data: self.source[start..end].to_string(),
            span: Span::from_offsets(start, end),
        }))
    }

    /// Parses an element, or returns `None` (consuming nothing) when the `<`
    /// is not followed by a tag name.
    fn parse_element(&mut self) -> Option<Node> {
        let start = self.current().span.range().start;
        let checkpoint = self.pos;
        self.advance();

        if !self.check(TokenKind::Name) {
            self.error(ParseErrorKind::InvalidTagName {
                name: self.current_text().to_string(),
            });
            self.pos = checkpoint;
            return None;
        }

        let name = SmolStr::new(self.current_text());
        self.advance();

        let attributes = self.parse_attributes();

        let explicit_self_closing = self.eat(TokenKind::SlashRAngle);
        if !explicit_self_closing {
            self.expect(TokenKind::RAngle);
        }
        let self_closing = explicit_self_closing || is_void_element(&name);

        let children = if self_closing {
            Vec::new()
        } else {
            self.parse_children(&name)
        };

        if !self_closing {
            self.parse_closing_tag(&name);
        }

        let end = self.previous_end().max(start);
        Some(Node::Element(Element {
            name,
            attributes,
            children,
            span: Span::from_offsets(start, end),
        }))
    }

    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes: Vec<Attribute> = Vec::new();

        loop {
            self.skip_newlines();

            match self.current_kind() {
                TokenKind::RAngle | TokenKind::SlashRAngle | TokenKind::Eof => break,
                TokenKind::Name => {
                    let attr = self.parse_attribute();
                    if attributes.iter().any(|a| a.name == attr.name) {
                        self.errors.push(ParseError::new(
                            ParseErrorKind::DuplicateAttribute {
                                name: attr.name.to_string(),
                            },
                            attr.span,
                        ));
                    } else {
                        attributes.push(attr);
                    }
                }
                TokenKind::LAngle | TokenKind::LAngleSlash | TokenKind::CommentOpen => {
                    // The tag was never closed; let the caller report it.
                    break;
                }
                _ => {
                    self.error(ParseErrorKind::UnexpectedToken {
                        expected: "attribute name".to_string(),
                        found: self.current_kind().name().to_string(),
                    });
                    self.advance();
                }
            }
        }

        attributes
    }

    fn parse_attribute(&mut self) -> Attribute {
        let start = self.current().span.range().start;
        let name = SmolStr::new(self.current_text());
        self.advance();
        self.skip_newlines();

        if !self.eat(TokenKind::Eq) {
            return Attribute {
                name,
                value: None,
                span: Span::from_offsets(start, self.previous_end()),
            };
        }
        self.skip_newlines();

        let value = match self.current_kind() {
            TokenKind::DoubleQuote => Some(self.parse_quoted_value('"', TokenKind::DoubleQuote)),
            TokenKind::SingleQuote => Some(self.parse_quoted_value('\'', TokenKind::SingleQuote)),
            TokenKind::Name | TokenKind::Text => {
                let text = self.current_text().to_string();
                self.advance();
                Some(text)
            }
            _ => {
                self.error(ParseErrorKind::UnexpectedToken {
                    expected: "attribute value".to_string(),
                    found: self.current_kind().name().to_string(),
                });
                None
            }
        };

        Attribute {
            name,
            value,
            span: Span::from_offsets(start, self.previous_end()),
        }
    }

    /// Reads a quoted value straight from the source so that `<`, `>` and
    /// the other quote character are preserved verbatim.
    fn parse_quoted_value(&mut self, quote: char, quote_token: TokenKind) -> String {
        let content_start = self.current().span.range().end;
        let remaining = &self.source[content_start..];

        match remaining.find(quote) {
            Some(pos) => {
                let content_end = content_start + pos;
                self.advance();
                self.skip_to(content_end);
                self.eat(quote_token);
                remaining[..pos].to_string()
            }
            None => {
                self.error(ParseErrorKind::UnexpectedEof {
                    expected: format!("closing {quote}"),
                });
                self.skip_to(self.source.len());
                remaining.to_string()
            }
        }
    }

    fn parse_children(&mut self, parent_tag: &str) -> Vec<Node> {
        let mut children = Vec::new();

        loop {
            match self.current_kind() {
                TokenKind::Eof | TokenKind::LAngleSlash => break,
                _ => match self.parse_node() {
                    Some(node) => children.push(node),
                    None => self.advance(),
                },
            }
        }

        if self.check(TokenKind::Eof) {
            self.error(ParseErrorKind::UnclosedTag {
                tag_name: parent_tag.to_string(),
            });
        }

        children
    }

    fn parse_closing_tag(&mut self, expected_name: &str) {
        if !self.eat(TokenKind::LAngleSlash) {
            return;
        }

        let found_name = if self.check(TokenKind::Name) {
            let name = self.current_text().to_string();
            self.advance();
            name
        } else {
            String::new()
        };

        if found_name != expected_name {
            self.error(ParseErrorKind::MismatchedClosingTag {
                expected: expected_name.to_string(),
                found: found_name,
            });
        }

        self.skip_newlines();
        self.expect(TokenKind::RAngle);
    }

    fn skip_stray_closing_tag(&mut self) {
        let start = self.current().span;
        self.advance();
        let tag_name = if self.check(TokenKind::Name) {
            self.current_text().to_string()
        } else {
            String::new()
        };
        self.errors.push(ParseError::new(
            ParseErrorKind::UnexpectedClosingTag { tag_name },
            start,
        ));
        while !self.check(TokenKind::Eof) && !self.eat(TokenKind::RAngle) {
            self.advance();
        }
    }
}
