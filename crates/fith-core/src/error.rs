//! Unified error types for fith.
//!
//! This module provides a consistent error type hierarchy for all phases of
//! template processing: lexing, parsing, loading, compilation and rendering.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FithError (top-level wrapper)
//! ├── LexError      - Tokenizer errors (always carry a span)
//! ├── ParseError    - Parser errors (with ParseErrorKind)
//! ├── LoadError     - Template source could not be found/read/parsed
//! ├── CompileError  - Dependency resolution errors
//! ├── EvalError     - Render-time errors
//! └── ConfigError   - Invalid engine configuration
//! ```
//!
//! Each phase-specific error type can be used directly for fine-grained
//! handling, or converted into [`FithError`] with `?`.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during tokenization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered inside an expression.
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    /// A string literal hit a newline or the end of input before its closing quote.
    #[error("unterminated string literal at {span}")]
    UnterminatedString { span: Span },

    /// A `{{# ... #}}` comment was never closed.
    #[error("unterminated comment at {span}")]
    UnterminatedComment { span: Span },

    /// A single `&` that is not part of `&&`.
    #[error("expected '&&', found lone '&' at {span}")]
    LoneAmpersand { span: Span },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::LoneAmpersand { span } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// Unexpected end of input.
    UnexpectedEof,
    /// A value expression was expected.
    ExpectedExpression,
    /// An identifier was expected (filter name, parameter name).
    ExpectedIdentifier,
    /// A quoted template or block name was expected.
    ExpectedName,
    /// The closing delimiter of an action was expected.
    MissingCloseDelimiter,
    /// A control construct was never terminated with `end`.
    MissingEnd,
    /// A numeric literal could not be converted.
    InvalidNumber,
    /// The tokenizer rejected the input.
    Lexical,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEof => "unexpected end of input",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedName => "expected name",
            ParseErrorKind::MissingCloseDelimiter => "missing closing delimiter",
            ParseErrorKind::MissingEnd => "missing end",
            ParseErrorKind::InvalidNumber => "invalid number",
            ParseErrorKind::Lexical => "lexical error",
        }
    }
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parse error with location and context.
///
/// Parsing stops at the first error; there is no partial AST.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {span}: {message}")]
pub struct ParseError {
    /// The category of this error.
    pub kind: ParseErrorKind,
    /// The source location where the error occurred.
    pub span: Span,
    /// A detailed error message.
    pub message: String,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an "expected token" error.
    pub fn expected_token(span: Span, expected: &str, found: &str) -> Self {
        Self::new(
            ParseErrorKind::ExpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    /// Create an "unexpected token" error.
    pub fn unexpected_token(span: Span, token: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("unexpected token: {token}"),
        )
    }

    /// Create an "unexpected end of input" error.
    pub fn unexpected_eof(span: Span, while_parsing: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof,
            span,
            format!("unexpected end of input while parsing {while_parsing}"),
        )
    }

    /// Create a "missing end" error for an unterminated construct.
    pub fn missing_end(span: Span, construct: &str) -> Self {
        Self::new(
            ParseErrorKind::MissingEnd,
            span,
            format!("expected {{{{end}}}} to close {construct}"),
        )
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lexical, err.span(), err.to_string())
    }
}

// ============================================================================
// Load Errors
// ============================================================================

/// Errors reported by template loaders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// No template is registered or stored under this name.
    #[error("template '{name}' not found")]
    NotFound { name: String },

    /// The template exists but could not be read.
    #[error("failed to read template '{name}': {message}")]
    Io { name: String, message: String },

    /// The template source failed to parse.
    #[error("failed to parse template '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    /// Name of the template the loader was asked for.
    pub fn name(&self) -> &str {
        match self {
            LoadError::NotFound { name } => name,
            LoadError::Io { name, .. } => name,
            LoadError::Parse { name, .. } => name,
        }
    }
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that occur while resolving a template's dependencies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A template, or an `include`/`extends` target, does not exist.
    #[error("template '{name}' not found")]
    TemplateNotFound { name: String },

    /// A template exists but the loader failed to produce it.
    #[error("failed to load template '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },

    /// Source handed directly to the compiler failed to parse.
    #[error("failed to parse template '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
}

// ============================================================================
// Function Errors
// ============================================================================

/// Errors reported by native template functions.
///
/// Functions validate their own arity and argument kinds; the evaluator
/// attaches the call-site span when converting into [`EvalError`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunctionError {
    /// Wrong number of arguments.
    #[error("{function}: expected {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },

    /// An argument had the wrong kind.
    #[error("{function}: argument {position} must be {expected}, got {found}")]
    Type {
        function: String,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// An argument had the right kind but an unusable value.
    #[error("{function}: {message}")]
    Invalid { function: String, message: String },
}

impl FunctionError {
    /// Create an arity error.
    pub fn arity(function: &str, expected: usize, got: usize) -> Self {
        FunctionError::Arity {
            function: function.to_string(),
            expected,
            got,
        }
    }

    /// Create a type error for the 1-based argument `position`.
    pub fn type_mismatch(
        function: &str,
        position: usize,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        FunctionError::Type {
            function: function.to_string(),
            position,
            expected,
            found,
        }
    }

    /// Create an invalid-value error.
    pub fn invalid(function: &str, message: impl Into<String>) -> Self {
        FunctionError::Invalid {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// Errors that occur while rendering a compiled template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A variable path could not be resolved.
    #[error("at {span}: undefined variable '{segment}' in path '{path}'")]
    UndefinedVariable {
        segment: String,
        path: String,
        span: Span,
    },

    /// A variable node had no path segments.
    #[error("at {span}: empty variable path")]
    EmptyPath { span: Span },

    /// `range` over a value that is neither a sequence nor a mapping.
    #[error("at {span}: value of kind {kind} is not iterable")]
    NotIterable { kind: &'static str, span: Span },

    /// A binary operator was applied to unsupported operand kinds.
    #[error("at {span}: cannot apply '{op}' to {left} and {right}")]
    InvalidOperand {
        op: String,
        left: &'static str,
        right: &'static str,
        span: Span,
    },

    /// A unary operator was applied to an unsupported operand kind.
    #[error("at {span}: cannot apply unary '{op}' to {operand}")]
    InvalidUnaryOperand {
        op: String,
        operand: &'static str,
        span: Span,
    },

    /// Division by zero.
    #[error("at {span}: division by zero")]
    DivisionByZero { span: Span },

    /// Modulo by zero.
    #[error("at {span}: modulo by zero")]
    ModuloByZero { span: Span },

    /// A call or filter named a function that is not registered.
    #[error("at {span}: unknown function '{name}'")]
    UnknownFunction { name: String, span: Span },

    /// A function rejected its arguments.
    #[error("at {span}: {cause}")]
    Function {
        name: String,
        #[source]
        cause: FunctionError,
        span: Span,
    },

    /// A sequence index outside `0..len`.
    #[error("at {span}: index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: i64, len: usize, span: Span },

    /// A sequence was indexed by something other than an integer.
    #[error("at {span}: sequence index must be an integer, found {found}")]
    InvalidIndex { found: &'static str, span: Span },

    /// The indexed value supports neither positional nor keyed access.
    #[error("at {span}: cannot index value of kind {kind}")]
    NotIndexable { kind: &'static str, span: Span },

    /// An include target is already being rendered further up the include stack.
    #[error("circular include detected: '{name}' (stack: {})", stack.join(" -> "))]
    CircularInclude { name: String, stack: Vec<String> },

    /// An extends chain revisits a template.
    #[error("circular extends detected: '{name}'")]
    CircularExtends { name: String },

    /// The include stack would grow past the configured limit.
    #[error("maximum include depth exceeded ({max}) while including '{name}'")]
    IncludeDepthExceeded { name: String, max: usize },

    /// An included or extended template could not be loaded.
    #[error("failed to load template '{name}': {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },

    /// An error raised while rendering a named template.
    #[error("in template '{template}': {source}")]
    InTemplate {
        template: String,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Attach the name of the template being rendered.
    pub fn in_template(self, template: impl Into<String>) -> Self {
        EvalError::InTemplate {
            template: template.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every [`EvalError::InTemplate`] layer removed.
    pub fn root(&self) -> &EvalError {
        let mut current = self;
        while let EvalError::InTemplate { source, .. } = current {
            current = source;
        }
        current
    }

    /// Source location of the innermost error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self.root() {
            EvalError::UndefinedVariable { span, .. }
            | EvalError::EmptyPath { span }
            | EvalError::NotIterable { span, .. }
            | EvalError::InvalidOperand { span, .. }
            | EvalError::InvalidUnaryOperand { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::ModuloByZero { span }
            | EvalError::UnknownFunction { span, .. }
            | EvalError::Function { span, .. }
            | EvalError::IndexOutOfBounds { span, .. }
            | EvalError::InvalidIndex { span, .. }
            | EvalError::NotIndexable { span, .. } => Some(*span),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The open or close delimiter is empty.
    #[error("delimiters cannot be empty")]
    EmptyDelimiter,

    /// Open and close delimiters are the same string.
    #[error("open and close delimiters must differ (both are '{0}')")]
    IdenticalDelimiters(String),

    /// `max_include_depth` must be at least 1.
    #[error("max include depth must be at least 1, got {0}")]
    InvalidIncludeDepth(usize),

    /// The file-system loader needs at least one extension to try.
    #[error("at least one template extension is required")]
    NoExtensions,
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Top-level error wrapping every phase.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FithError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FithError {
    pub fn is_lex(&self) -> bool {
        matches!(self, FithError::Lex(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FithError::Parse(_))
    }

    pub fn is_load(&self) -> bool {
        matches!(self, FithError::Load(_))
    }

    pub fn is_compile(&self) -> bool {
        matches!(self, FithError::Compile(_))
    }

    pub fn is_eval(&self) -> bool {
        matches!(self, FithError::Eval(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, FithError::Config(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
