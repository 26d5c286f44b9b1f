//! Template markup lexer using logos.
//!
//! The lexer only needs to recognise tag structure: angle brackets, names,
//! `=` and quotes. Text content and attribute values are read directly from
//! the source by the parser, which then skips the tokens it consumed.

use crate::Span;
use logos::Logos;
use text_size::TextSize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for template markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    /// `<!--`
    #[token("<!--", priority = 12)]
    CommentOpen,

    /// `</`
    #[token("</", priority = 10)]
    LAngleSlash,

    /// `<`
    #[token("<", priority = 10)]
    LAngle,

    /// `/>`
    #[token("/>", priority = 10)]
    SlashRAngle,

    /// `>`
    #[token(">", priority = 10)]
    RAngle,

    /// `=`
    #[token("=", priority = 10)]
    Eq,

    /// `"`
    #[token("\"", priority = 10)]
    DoubleQuote,

    /// `'`
    #[token("'", priority = 10)]
    SingleQuote,

    /// `/` outside of `/>`
    #[token("/", priority = 10)]
    Slash,

    /// Newline
    #[token("\n", priority = 10)]
    Newline,

    /// A tag or attribute name, including directive prefixes such as
    /// `:src`, `@click.stop` and `v-bind:title`.
    #[regex(r"[a-zA-Z_:@#][a-zA-Z0-9_\-:.@#]*", priority = 4)]
    Name,

    /// Any other run of characters; only meaningful inside text content.
    #[regex(r#"[^\s<>="'/]+"#, priority = 1)]
    Text,

    /// End of input
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::CommentOpen => "'<!--'",
            TokenKind::LAngleSlash => "'</'",
            TokenKind::LAngle => "'<'",
            TokenKind::SlashRAngle => "'/>'",
            TokenKind::RAngle => "'>'",
            TokenKind::Eq => "'='",
            TokenKind::DoubleQuote => "'\"'",
            TokenKind::SingleQuote => "'''",
            TokenKind::Slash => "'/'",
            TokenKind::Newline => "newline",
            TokenKind::Name => "name",
            TokenKind::Text => "text",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer for template markup.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(result) => {
                let span = self.inner.span();
                Some(Token {
                    kind: result.unwrap_or(TokenKind::Error),
                    span: Span::from_offsets(span.start, span.end),
                })
            }
            None => {
                self.finished = true;
                let end = TextSize::from(self.source.len() as u32);
                Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::empty(end),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_simple_tag() {
        assert_eq!(
            tokenize("<div>"),
            vec![TokenKind::LAngle, TokenKind::Name, TokenKind::RAngle]
        );
    }

    #[test]
    fn test_directive_names() {
        let tokens = tokenize(r#"<img :src="a" @click.stop="go" v-bind:alt="b" />"#);
        assert_eq!(
            tokens,
            vec![
                TokenKind::LAngle,
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::DoubleQuote,
                TokenKind::Name,
                TokenKind::DoubleQuote,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::DoubleQuote,
                TokenKind::Name,
                TokenKind::DoubleQuote,
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::DoubleQuote,
                TokenKind::Name,
                TokenKind::DoubleQuote,
                TokenKind::SlashRAngle,
            ]
        );
    }

    #[test]
    fn test_closing_and_comment() {
        assert_eq!(
            tokenize("<!-- x --></div>"),
            vec![
                TokenKind::CommentOpen,
                TokenKind::Name,
                TokenKind::Text,
                TokenKind::RAngle,
                TokenKind::LAngleSlash,
                TokenKind::Name,
                TokenKind::RAngle,
            ]
        );
    }

    #[test]
    fn test_eof_token_is_last() {
        let last = Lexer::new("a").last().map(|t| t.kind);
        assert_eq!(last, Some(TokenKind::Eof));
    }
}
