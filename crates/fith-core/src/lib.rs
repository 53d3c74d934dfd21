//! Shared vocabulary for the fith template engine.
//!
//! This crate provides the types every other fith crate agrees on:
//! - [`Span`] source locations
//! - The error hierarchy ([`LexError`], [`ParseError`], [`EvalError`], ...)
//! - The dynamically typed [`Value`] model templates render against

mod error;
mod span;
mod value;

pub use error::{
    CompileError, ConfigError, EvalError, FithError, FunctionError, LexError, LoadError,
    ParseError, ParseErrorKind,
};
pub use span::Span;
pub use value::{Record, Value};
