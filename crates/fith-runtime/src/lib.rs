//! Fith Runtime
//!
//! Renders compiled templates against data.
//!
//! ## Modules
//!
//! - [`context`]: Root value, scope stack and the RAII [`ScopeGuard`]
//! - [`evaluator`]: Node and expression evaluation
//! - [`ops`]: Operator semantics over [`Value`](fith_core::Value)
//! - `composition`: `extends`, `block` and `include`
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use fith_compiler::TemplateLoader;
//! use fith_core::{LoadError, Value};
//! use fith_parser::{Parser, Template};
//! use fith_registry::FunctionRegistry;
//! use fith_runtime::{Context, Evaluator, RenderOptions};
//!
//! struct NoTemplates;
//!
//! impl TemplateLoader for NoTemplates {
//!     fn load(&self, name: &str) -> Result<Arc<Template>, LoadError> {
//!         Err(LoadError::NotFound { name: name.to_string() })
//!     }
//!     fn exists(&self, _: &str) -> bool {
//!         false
//!     }
//! }
//!
//! let template = Parser::parse("{{range .}}{{@index}}:{{.}} {{end}}").unwrap();
//! let registry = FunctionRegistry::new();
//! let mut evaluator = Evaluator::new(&registry, &NoTemplates, RenderOptions::default());
//! let mut ctx = Context::new(vec!["a", "b", "c"]);
//!
//! let out = evaluator.render_named("list", &template, &mut ctx).unwrap();
//! assert_eq!(out, "0:a 1:b 2:c ");
//! ```

mod composition;
pub mod context;
pub mod evaluator;
pub mod ops;

pub use context::{Context, ScopeGuard};
pub use evaluator::{Evaluator, LOOP_FIRST, LOOP_INDEX, LOOP_LAST, RenderOptions};

pub use fith_core::EvalError;
