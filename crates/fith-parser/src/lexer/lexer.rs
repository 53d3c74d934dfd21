//! Main lexer implementation for templates.
//!
//! The [`Lexer`] converts template source into a stream of [`Token`]s. It
//! runs in one of two modes: *text* mode scans verbatim until the opening
//! delimiter, *expression* mode skips whitespace and dispatches on the first
//! character of each token until the closing delimiter switches back.

use std::collections::VecDeque;

use fith_core::{LexError, Span};

use super::cursor::{Cursor, is_ident_continue, is_ident_start};
use super::token::{Token, TokenKind, lookup_keyword};

/// The pair of strings that open and close template actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Expression,
}

/// Lexer for template source.
///
/// Provides lookahead via [`peek`](Self::peek) and
/// [`peek_nth`](Self::peek_nth). Errors are recorded and surfaced as
/// [`TokenKind::Error`] tokens; the first one can be retrieved with
/// [`take_error`](Self::take_error).
pub struct Lexer<'src> {
    /// Low-level character cursor.
    cursor: Cursor<'src>,
    open: &'src str,
    close: &'src str,
    mode: Mode,
    /// Lookahead buffer for peeking.
    lookahead: VecDeque<Token<'src>>,
    /// Accumulated errors.
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source and delimiters.
    pub fn new(source: &'src str, delimiters: &'src Delimiters) -> Self {
        Self {
            cursor: Cursor::new(source),
            open: &delimiters.open,
            close: &delimiters.close,
            mode: Mode::Text,
            lookahead: VecDeque::with_capacity(2),
            errors: Vec::new(),
        }
    }

    /// Take the first recorded error, discarding the rest.
    pub fn take_error(&mut self) -> Option<LexError> {
        let mut errors = std::mem::take(&mut self.errors);
        if errors.is_empty() {
            None
        } else {
            Some(errors.swap_remove(0))
        }
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        if let Some(token) = self.lookahead.pop_front() {
            return token;
        }
        self.scan_token()
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Token<'src> {
        self.peek_nth(0)
    }

    /// Peek `n` tokens ahead (0 = next token).
    pub fn peek_nth(&mut self, n: usize) -> Token<'src> {
        while self.lookahead.len() <= n {
            let token = self.scan_token();
            self.lookahead.push_back(token);
        }
        self.lookahead[n]
    }

    // =========================================
    // Internal: Token scanning
    // =========================================

    fn scan_token(&mut self) -> Token<'src> {
        match self.mode {
            Mode::Text => self.scan_text_mode(),
            Mode::Expression => self.scan_expression_mode(),
        }
    }

    /// Scan verbatim text up to the next opening delimiter.
    fn scan_text_mode(&mut self) -> Token<'src> {
        loop {
            if self.cursor.is_eof() {
                return self.make_eof();
            }

            let start_line = self.cursor.line();
            let start_col = self.cursor.column();
            let start_offset = self.cursor.offset();

            if self.is_comment_start() {
                if let Err(error) = self.skip_comment(start_line, start_col, start_offset) {
                    return self.make_error(error);
                }
                continue;
            }
            if self.cursor.eat_str(self.open) {
                self.mode = Mode::Expression;
                return self.make_token(TokenKind::OpenDelim, start_line, start_col, start_offset);
            }

            let text_len = self
                .cursor
                .rest()
                .find(self.open)
                .unwrap_or(self.cursor.rest().len());
            self.cursor.advance_bytes(text_len);
            return self.make_token(TokenKind::Text, start_line, start_col, start_offset);
        }
    }

    fn is_comment_start(&self) -> bool {
        self.cursor
            .rest()
            .strip_prefix(self.open)
            .is_some_and(|rest| rest.starts_with('#'))
    }

    /// Skip a `{{# ... #}}` comment, including both delimiters.
    fn skip_comment(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Result<(), LexError> {
        self.cursor.advance_bytes(self.open.len() + 1);
        let terminator_len = 1 + self.close.len();
        loop {
            let rest = self.cursor.rest();
            match rest.find('#') {
                Some(pos) if rest[pos + 1..].starts_with(self.close) => {
                    self.cursor.advance_bytes(pos + terminator_len);
                    return Ok(());
                }
                Some(pos) => self.cursor.advance_bytes(pos + 1),
                None => {
                    self.cursor.advance_bytes(rest.len());
                    let len = self.cursor.offset() - start_offset;
                    return Err(LexError::UnterminatedComment {
                        span: Span::new(start_line, start_col, len),
                    });
                }
            }
        }
    }

    /// Scan one token inside an action.
    fn scan_expression_mode(&mut self) -> Token<'src> {
        self.cursor.eat_while(char::is_whitespace);

        if self.cursor.is_eof() {
            return self.make_eof();
        }

        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let start_offset = self.cursor.offset();

        if self.cursor.eat_str(self.close) {
            self.mode = Mode::Text;
            return self.make_token(TokenKind::CloseDelim, start_line, start_col, start_offset);
        }

        match self.cursor.peek() {
            Some(quote @ ('"' | '\'')) => self.scan_string(quote, start_line, start_col, start_offset),
            Some(c) if c.is_ascii_digit() => self.scan_number(start_line, start_col, start_offset),
            Some(c) if is_ident_start(c) => self.scan_identifier(start_line, start_col, start_offset),
            _ => self.scan_operator(start_line, start_col, start_offset),
        }
    }

    fn make_eof(&self) -> Token<'src> {
        let span = Span::point(self.cursor.line(), self.cursor.column());
        Token::new(TokenKind::Eof, "", span)
    }

    /// Create a token from start position to current position.
    fn make_token(&self, kind: TokenKind, start_line: u32, start_col: u32, start_offset: u32) -> Token<'src> {
        let len = self.cursor.offset() - start_offset;
        let span = Span::new(start_line, start_col, len);
        Token::new(kind, self.cursor.slice_from(start_offset), span)
    }

    /// Create an error token and record the error.
    fn make_error(&mut self, error: LexError) -> Token<'src> {
        let span = error.span();
        self.errors.push(error);
        Token::new(TokenKind::Error, "", span)
    }

    // =========================================
    // Scanning: Strings
    // =========================================

    /// Scan a quoted string. The lexeme excludes the quotes and keeps
    /// backslash escapes verbatim.
    fn scan_string(&mut self, quote: char, start_line: u32, start_col: u32, start_offset: u32) -> Token<'src> {
        self.cursor.advance();
        let content_start = self.cursor.offset();

        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let len = self.cursor.offset() - start_offset;
                    let error = LexError::UnterminatedString {
                        span: Span::new(start_line, start_col, len),
                    };
                    return self.make_error(error);
                }
                Some('\\') => {
                    self.cursor.advance();
                    if self.cursor.check(|c| c != '\n') {
                        self.cursor.advance();
                    }
                }
                Some(c) if c == quote => {
                    let content = self.cursor.slice_from(content_start);
                    self.cursor.advance();
                    let len = self.cursor.offset() - start_offset;
                    return Token::new(
                        TokenKind::StringLiteral,
                        content,
                        Span::new(start_line, start_col, len),
                    );
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // =========================================
    // Scanning: Numbers
    // =========================================

    /// Scan a decimal number. A `.` is only consumed when a digit follows,
    /// so `1.Field` stays an integer followed by a dot.
    fn scan_number(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'src> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let mut kind = TokenKind::IntLiteral;
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
            kind = TokenKind::FloatLiteral;
        }

        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Identifiers and keywords
    // =========================================

    fn scan_identifier(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'src> {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);

        let lexeme = self.cursor.slice_from(start_offset);
        let kind = lookup_keyword(lexeme).unwrap_or(TokenKind::Identifier);

        self.make_token(kind, start_line, start_col, start_offset)
    }

    // =========================================
    // Scanning: Operators
    // =========================================

    /// Scan an operator or punctuation token.
    ///
    /// Two-character forms are matched by eating the second character in a
    /// guard.
    fn scan_operator(&mut self, start_line: u32, start_col: u32, start_offset: u32) -> Token<'src> {
        let Some(c) = self.cursor.advance() else {
            return self.make_eof();
        };

        let kind = match c {
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,

            '=' if self.cursor.eat('=') => TokenKind::EqualEqual,
            '=' => TokenKind::Equal,

            '!' if self.cursor.eat('=') => TokenKind::BangEqual,
            '!' => TokenKind::Bang,

            '<' if self.cursor.eat('=') => TokenKind::LessEqual,
            '<' => TokenKind::Less,

            '>' if self.cursor.eat('=') => TokenKind::GreaterEqual,
            '>' => TokenKind::Greater,

            '&' if self.cursor.eat('&') => TokenKind::AmpAmp,
            '&' => {
                let error = LexError::LoneAmpersand {
                    span: Span::new(start_line, start_col, 1),
                };
                return self.make_error(error);
            }

            '|' if self.cursor.eat('|') => TokenKind::PipePipe,
            '|' => TokenKind::Pipe,

            _ => {
                let len = self.cursor.offset() - start_offset;
                let error = LexError::UnexpectedChar {
                    ch: c,
                    span: Span::new(start_line, start_col, len),
                };
                return self.make_error(error);
            }
        };

        self.make_token(kind, start_line, start_col, start_offset)
    }
}

/// Implement Iterator for convenient token streaming.
impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Tokenize a whole template, stopping at the first lexical error.
pub fn tokenize<'src>(source: &'src str, delimiters: &'src Delimiters) -> Result<Vec<Token<'src>>, LexError> {
    let mut lexer = Lexer::new(source, delimiters);
    let mut tokens = Vec::new();
    for token in lexer.by_ref() {
        if token.kind == TokenKind::Error {
            break;
        }
        tokens.push(token);
    }
    match lexer.take_error() {
        Some(error) => Err(error),
        None => Ok(tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, String)> {
        let delims = Delimiters::default();
        tokenize(source, &delims)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.lexeme.to_string()))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|(k, _)| k).collect()
    }

    fn lex_err(source: &str) -> LexError {
        let delims = Delimiters::default();
        tokenize(source, &delims).unwrap_err()
    }

    // =========================================
    // Text mode
    // =========================================

    #[test]
    fn empty_source() {
        let delims = Delimiters::default();
        let mut lexer = Lexer::new("", &delims);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn plain_text() {
        assert_eq!(lex("hello\nworld"), vec![(TokenKind::Text, "hello\nworld".to_string())]);
    }

    #[test]
    fn text_around_action() {
        assert_eq!(
            kinds("a {{ .X }} b"),
            vec![
                TokenKind::Text,
                TokenKind::OpenDelim,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::CloseDelim,
                TokenKind::Text,
            ]
        );
    }

    #[test]
    fn adjacent_actions_have_no_text_between() {
        assert_eq!(
            kinds("{{1}}{{2}}"),
            vec![
                TokenKind::OpenDelim,
                TokenKind::IntLiteral,
                TokenKind::CloseDelim,
                TokenKind::OpenDelim,
                TokenKind::IntLiteral,
                TokenKind::CloseDelim,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            lex("a{{# note {{.X}} #}}b"),
            vec![(TokenKind::Text, "a".to_string()), (TokenKind::Text, "b".to_string())]
        );
    }

    #[test]
    fn unterminated_comment() {
        assert!(matches!(lex_err("a{{# never closed"), LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn custom_delimiters() {
        let delims = Delimiters::new("<%", "%>");
        let tokens: Vec<_> = tokenize("x <% .A %> {{y}}", &delims)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            tokens,
            vec![
                TokenKind::Text,
                TokenKind::OpenDelim,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::CloseDelim,
                TokenKind::Text,
            ]
        );
    }

    // =========================================
    // Expression mode
    // =========================================

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("{{if else end range include extends block true false iffy @index}}")[1..12],
            [
                TokenKind::If,
                TokenKind::Else,
                TokenKind::End,
                TokenKind::Range,
                TokenKind::Include,
                TokenKind::Extends,
                TokenKind::Block,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Identifier,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("{{== = != ! < <= > >= && || | + - * / % , ( ) [ ]}}")[1..22],
            [
                TokenKind::EqualEqual,
                TokenKind::Equal,
                TokenKind::BangEqual,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Pipe,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Comma,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            lex("{{42 3.14 1.}}")[1..5],
            [
                (TokenKind::IntLiteral, "42".to_string()),
                (TokenKind::FloatLiteral, "3.14".to_string()),
                (TokenKind::IntLiteral, "1".to_string()),
                (TokenKind::Dot, ".".to_string()),
            ]
        );
    }

    #[test]
    fn strings_keep_escapes() {
        assert_eq!(
            lex(r#"{{"a\"b" 'c'}}"#)[1..3],
            [
                (TokenKind::StringLiteral, r#"a\"b"#.to_string()),
                (TokenKind::StringLiteral, "c".to_string()),
            ]
        );
    }

    #[test]
    fn positions() {
        let delims = Delimiters::default();
        let tokens = tokenize("ab\n{{ .Name }}", &delims).unwrap();
        assert_eq!(tokens[0].span, Span::new(1, 1, 3));
        assert_eq!(tokens[1].span, Span::new(2, 1, 2));
        assert_eq!(tokens[2].span, Span::new(2, 4, 1));
        assert_eq!(tokens[3].span, Span::new(2, 5, 4));
    }

    // =========================================
    // Errors
    // =========================================

    #[test]
    fn unterminated_string() {
        assert!(matches!(lex_err("{{\"abc"), LexError::UnterminatedString { .. }));
        let err = lex_err("{{'ab\ncd'}}");
        assert_eq!(err.span().line, 1);
        assert_eq!(err.span().col, 3);
    }

    #[test]
    fn lone_ampersand() {
        let err = lex_err("{{.A & .B}}");
        assert_eq!(err, LexError::LoneAmpersand { span: Span::new(1, 6, 1) });
    }

    #[test]
    fn unexpected_char() {
        assert!(matches!(lex_err("{{ $x }}"), LexError::UnexpectedChar { ch: '$', .. }));
        assert!(matches!(lex_err("{{ .A : .B }}"), LexError::UnexpectedChar { ch: ':', .. }));
    }

    #[test]
    fn deterministic() {
        let source = "{{range .Items}}{{@index}}:{{.}} {{end}}";
        assert_eq!(lex(source), lex(source));
    }
}
