//! Token types for the template lexer.

use fith_core::Span;
use std::fmt;

/// A token from template source.
///
/// The lexeme borrows from the source. For string literals it is the text
/// between the quotes, escapes untouched.
#[derive(Clone, Copy, PartialEq)]
pub struct Token<'src> {
    /// The type of token.
    pub kind: TokenKind,
    /// The source text of this token.
    pub lexeme: &'src str,
    /// Location in source.
    pub span: Span,
}

impl<'src> Token<'src> {
    /// Create a new token.
    #[inline]
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?} @ {:?})", self.kind, self.lexeme, self.span)
    }
}

/// All token types the template lexer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================
    // Text mode
    // =========================================
    /// Verbatim text outside delimiters
    Text,
    /// Opening action delimiter, `{{` by default
    OpenDelim,
    /// Closing action delimiter, `}}` by default
    CloseDelim,

    // =========================================
    // Literals
    // =========================================
    /// Integer literal: `42`
    IntLiteral,
    /// Float literal: `3.14`
    FloatLiteral,
    /// String literal: `"hello"`, `'hi'`
    StringLiteral,

    // =========================================
    // Identifiers
    // =========================================
    /// Identifier, including `@`-prefixed loop bindings
    Identifier,

    // =========================================
    // Keywords
    // =========================================
    If,
    Else,
    End,
    Range,
    Include,
    Extends,
    Block,
    True,
    False,

    // =========================================
    // Operators - Arithmetic
    // =========================================
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // =========================================
    // Operators - Comparison
    // =========================================
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // =========================================
    // Operators - Logical
    // =========================================
    AmpAmp,
    PipePipe,
    Bang,

    // =========================================
    // Operators - Other
    // =========================================
    /// Filter pipe `|`
    Pipe,
    /// Named include parameter `=`
    Equal,
    Dot,
    Comma,

    // =========================================
    // Delimiters
    // =========================================
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // =========================================
    // Special
    // =========================================
    Eof,
    Error,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            If | Else | End | Range | Include | Extends | Block | True | False
        )
    }

    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            IntLiteral | FloatLiteral | StringLiteral | True | False
        )
    }

    /// Whether this token is one of the binary operators a value
    /// expression may apply after its first primary.
    pub fn is_binary_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Plus | Minus
                | Star
                | Slash
                | Percent
                | EqualEqual
                | BangEqual
                | Less
                | LessEqual
                | Greater
                | GreaterEqual
                | AmpAmp
                | PipePipe
        )
    }

    /// Whether a primary expression can start with this token.
    pub fn starts_primary(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Dot | Identifier
                | StringLiteral
                | IntLiteral
                | FloatLiteral
                | True
                | False
                | Bang
                | Minus
                | LeftParen
        )
    }

    pub fn description(self) -> &'static str {
        use TokenKind::*;
        match self {
            Text => "text",
            OpenDelim => "opening delimiter",
            CloseDelim => "closing delimiter",
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            StringLiteral => "string literal",
            Identifier => "identifier",
            If => "'if'",
            Else => "'else'",
            End => "'end'",
            Range => "'range'",
            Include => "'include'",
            Extends => "'extends'",
            Block => "'block'",
            True => "'true'",
            False => "'false'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            Less => "'<'",
            LessEqual => "'<='",
            Greater => "'>'",
            GreaterEqual => "'>='",
            AmpAmp => "'&&'",
            PipePipe => "'||'",
            Bang => "'!'",
            Pipe => "'|'",
            Equal => "'='",
            Dot => "'.'",
            Comma => "','",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Eof => "end of input",
            Error => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Map a keyword string to its [`TokenKind`], or `None` if not a keyword.
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ident {
        "if" => If,
        "else" => Else,
        "end" => End,
        "range" => Range,
        "include" => Include,
        "extends" => Extends,
        "block" => Block,
        "true" => True,
        "false" => False,
        _ => return None,
    })
}
