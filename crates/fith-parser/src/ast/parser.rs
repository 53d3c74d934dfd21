//! Core parser state and token helpers.
//!
//! The grammar itself lives in `node_parser.rs` (template structure and
//! directives) and `expr_parser.rs` (value expressions).

use fith_core::{ParseError, ParseErrorKind, Span};

use crate::ast::Template;
use crate::lexer::{Delimiters, Lexer, Token, TokenKind};

/// Recursive-descent parser for templates.
///
/// Parsing stops at the first error; no partial AST is produced.
pub struct Parser<'src> {
    pub(super) lexer: Lexer<'src>,
    /// The most recently consumed token.
    pub(super) previous: Token<'src>,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source`.
    pub fn new(source: &'src str, delimiters: &'src Delimiters) -> Self {
        Self {
            lexer: Lexer::new(source, delimiters),
            previous: Token::new(TokenKind::Eof, "", Span::point(1, 1)),
        }
    }

    /// Parse a template using the default `{{` / `}}` delimiters.
    pub fn parse(source: &str) -> Result<Template, ParseError> {
        let delimiters = Delimiters::default();
        Parser::parse_with(source, &delimiters)
    }

    /// Parse a template using custom delimiters.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_with(source: &str, delimiters: &Delimiters) -> Result<Template, ParseError> {
        let mut parser = Parser::new(source, delimiters);
        let nodes = parser.parse_top_level()?;
        Ok(Template::new(nodes))
    }

    // =========================================
    // Token helpers
    // =========================================

    /// Peek at the next token.
    #[inline]
    pub(super) fn peek(&mut self) -> Token<'src> {
        self.lexer.peek()
    }

    /// Peek `n` tokens ahead (0 = next token).
    #[inline]
    pub(super) fn peek_nth(&mut self, n: usize) -> Token<'src> {
        self.lexer.peek_nth(n)
    }

    /// Consume the next token.
    pub(super) fn advance(&mut self) -> Token<'src> {
        let token = self.lexer.next_token();
        self.previous = token;
        token
    }

    /// Check whether the next token has the given kind.
    #[inline]
    pub(super) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the next token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token<'src>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a token of the given kind or fail.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            return Ok(self.advance());
        }
        Err(self.unexpected(token, kind.description()))
    }

    /// Consume the closing delimiter of an action.
    pub(super) fn expect_close(&mut self) -> Result<Token<'src>, ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::CloseDelim {
            return Ok(self.advance());
        }
        let mut err = self.unexpected(token, TokenKind::CloseDelim.description());
        if err.kind == ParseErrorKind::ExpectedToken {
            err.kind = ParseErrorKind::MissingCloseDelimiter;
        }
        Err(err)
    }

    /// Build the error for finding `token` where `expected` was required.
    ///
    /// Error tokens turn into the lexer error that produced them.
    pub(super) fn unexpected(&mut self, token: Token<'src>, expected: &str) -> ParseError {
        match token.kind {
            TokenKind::Error => match self.lexer.take_error() {
                Some(err) => err.into(),
                None => ParseError::new(ParseErrorKind::Lexical, token.span, "invalid token"),
            },
            TokenKind::Eof => ParseError::new(
                ParseErrorKind::UnexpectedEof,
                token.span,
                format!("expected {expected}, found end of input"),
            ),
            _ => ParseError::expected_token(token.span, expected, &describe(token)),
        }
    }

    /// Whether `next` starts right where the previously consumed token ended.
    pub(super) fn is_adjacent(&self, next: &Token<'src>) -> bool {
        adjacent(&self.previous, next)
    }
}

/// Whether `next` starts right where `prev` ends, with no whitespace between.
///
/// Only meaningful for tokens whose lexeme is their full source text
/// (identifiers, keywords, punctuation).
pub(super) fn adjacent(prev: &Token<'_>, next: &Token<'_>) -> bool {
    prev.span.line == next.span.line
        && next.span.col == prev.span.col + prev.lexeme.chars().count() as u32
}

/// Describe a token for error messages.
pub(super) fn describe(token: Token<'_>) -> String {
    match token.kind {
        TokenKind::Identifier | TokenKind::IntLiteral | TokenKind::FloatLiteral => {
            format!("{} '{}'", token.kind, token.lexeme)
        }
        TokenKind::StringLiteral => format!("string \"{}\"", token.lexeme),
        kind => kind.description().to_string(),
    }
}
