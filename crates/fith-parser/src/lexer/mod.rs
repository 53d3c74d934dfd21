//! Lexical analysis for templates.

mod cursor;
mod lexer;
mod token;

pub use lexer::{Delimiters, Lexer, tokenize};
pub use token::{Token, TokenKind, lookup_keyword};
