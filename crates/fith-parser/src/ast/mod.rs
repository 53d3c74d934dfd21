//! Abstract Syntax Tree (AST) for templates.
//!
//! This module provides:
//! - Template node definitions ([`Node`], [`Template`])
//! - Value expression definitions ([`Expr`])
//! - The recursive-descent [`Parser`]
//!
//! # Example
//!
//! ```
//! use fith_parser::Parser;
//!
//! let template = Parser::parse("Hello, {{.Name | upper}}!").unwrap();
//! assert_eq!(template.nodes.len(), 3);
//! ```

pub mod expr;
pub mod node;
pub mod ops;

mod expr_parser;
mod node_parser;
mod parser;

// Re-export error types from core
pub use fith_core::{ParseError, ParseErrorKind};

pub use expr::*;
pub use node::*;
pub use ops::*;
pub use parser::Parser;
