//! Value expression AST nodes.
//!
//! A value expression is what appears inside an output action or as the
//! condition/collection of a control construct:
//! - Variable paths (`.`, `.User.Name`)
//! - Literals (strings, numbers, booleans)
//! - One binary or unary operation
//! - Subscripts (`.Items[0]`)
//! - Function calls (`upper .Name`) and loop bindings (`@index`)
//! - Filter pipelines (`.Name | trim | upper`)

use crate::ast::{BinaryOp, UnaryOp};
use fith_core::{Span, Value};

/// The path segment naming the current scope value.
pub const CURRENT: &str = ".";

/// Prefix reserved for loop-context bindings such as `@index`.
pub const LOOP_SIGIL: char = '@';

/// A value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Variable path lookup
    Variable(VariableExpr),
    /// Literal value
    Literal(LiteralExpr),
    /// Binary operation
    Binary(Box<BinaryExpr>),
    /// Unary prefix operation
    Unary(Box<UnaryExpr>),
    /// Sequence/mapping subscript
    Index(Box<IndexExpr>),
    /// Function call or loop binding lookup
    Call(CallExpr),
    /// Filter pipeline
    Pipe(Box<PipeExpr>),
}

impl Expr {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Variable(e) => e.span,
            Self::Literal(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Index(e) => e.span,
            Self::Call(e) => e.span,
            Self::Pipe(e) => e.span,
        }
    }

    /// The literal boolean this expression denotes, if it is one.
    pub fn as_bool_literal(&self) -> Option<bool> {
        match self {
            Self::Literal(LiteralExpr {
                kind: LiteralKind::Bool(b),
                ..
            }) => Some(*b),
            _ => None,
        }
    }
}

/// A variable path.
///
/// The first segment is always [`CURRENT`]; the rest are field names, so
/// `.User.Name` is `[".", "User", "Name"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub path: Vec<String>,
    pub span: Span,
}

impl VariableExpr {
    /// The path as written in the template.
    pub fn display_path(&self) -> String {
        match self.path.split_first() {
            Some((_, [])) | None => CURRENT.to_string(),
            Some((_, fields)) => fields.iter().map(|f| format!(".{f}")).collect(),
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl LiteralKind {
    /// The runtime value of this literal.
    pub fn to_value(&self) -> Value {
        match self {
            LiteralKind::String(s) => Value::String(s.clone()),
            LiteralKind::Int(i) => Value::Int(*i),
            LiteralKind::Float(f) => Value::Float(*f),
            LiteralKind::Bool(b) => Value::Bool(*b),
        }
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
    pub span: Span,
}

/// A subscript: `object[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub object: Expr,
    pub index: Expr,
    pub span: Span,
}

/// A function call.
///
/// A zero-argument call whose name starts with [`LOOP_SIGIL`] is a lookup
/// of a loop binding rather than a function dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

impl CallExpr {
    pub fn is_loop_binding(&self) -> bool {
        self.args.is_empty() && self.name.starts_with(LOOP_SIGIL)
    }
}

/// A filter pipeline: `value | f | g`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeExpr {
    pub value: Expr,
    pub filters: Vec<Filter>,
    pub span: Span,
}

/// One named filter in a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub span: Span,
}
