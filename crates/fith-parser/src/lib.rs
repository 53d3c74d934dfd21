//! Template parser crate.
//!
//! This crate provides the front end of the fith template engine:
//! - Lexical analysis with configurable delimiters
//! - AST definitions for template nodes and value expressions
//! - A recursive-descent parser producing a [`Template`]
//!
//! # Example
//!
//! ```
//! use fith_parser::{Delimiters, Parser};
//!
//! let delimiters = Delimiters::new("<%", "%>");
//! match Parser::parse_with("<% if .Ready %>go<% end %>", &delimiters) {
//!     Ok(template) => println!("parsed {} nodes", template.nodes.len()),
//!     Err(err) => eprintln!("parse error: {err}"),
//! }
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{Node, Parser, Template};
pub use lexer::{Delimiters, Lexer, Token, TokenKind};
