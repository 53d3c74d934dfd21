//! Fith: a template engine with inheritance, includes and filters.
//!
//! Templates are plain text with actions between delimiters (`{{` and `}}`
//! by default):
//!
//! ```text
//! {{.User.Name}}                          output a value
//! {{if .Ready}}...{{else}}...{{end}}      conditional
//! {{range .Items}}{{@index}}{{end}}       loop with @index, @first, @last, @key
//! {{.Name | trim | upper}}                filter pipeline
//! {{truncate .Body 10}}                   function call
//! {{include "header" Title=.Title}}       include with parameters
//! {{extends "base"}}{{block "main"}}{{end}} inheritance
//! {{# comment #}}
//! ```
//!
//! # Crates
//!
//! - `fith-core`: [`Value`], [`Span`] and the error hierarchy
//! - `fith-parser`: lexer and parser
//! - `fith-compiler`: dependency resolution, optimization and caching
//! - `fith-registry` / `fith-modules`: template functions
//! - `fith-runtime`: the evaluator
//!
//! This crate ties them together behind [`Engine`].
//!
//! # Example
//!
//! ```
//! use fith::{Config, Engine, MemoryLoader};
//!
//! let engine = Engine::with_loader(Config::default(), MemoryLoader::default()).unwrap();
//! let data = serde_json::json!({"Items": ["a", "b", "c"]});
//! let out = engine.render_string("{{range .Items}}{{@index}}:{{.}} {{end}}", data).unwrap();
//! assert_eq!(out, "0:a 1:b 2:c ");
//! ```

mod config;
mod engine;
pub mod loader;

pub use config::{Config, DEFAULT_EXTENSIONS};
pub use engine::{Engine, INLINE_TEMPLATE, TEMPLATE_NAME};
pub use loader::{FileSystemLoader, MemoryLoader, TemplateLoader};

// Re-export the building blocks for callers that assemble their own pipeline.
pub use fith_compiler::{CompilationCache, CompiledTemplate, Compiler};
pub use fith_core::{
    CompileError, ConfigError, EvalError, FithError, FunctionError, LexError, LoadError,
    ParseError, ParseErrorKind, Record, Span, Value,
};
pub use fith_parser::{Delimiters, Parser, Template};
pub use fith_registry::{FunctionRegistry, Module, NativeFn};
pub use fith_runtime::{Context, Evaluator, RenderOptions};
