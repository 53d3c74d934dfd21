//! Built-in function modules for the fith template engine.
//!
//! - **string** - `upper`, `lower`, `title`, `trim`, `trimPrefix`,
//!   `trimSuffix`, `truncate`, `replace`
//! - **collections** - `join`, `len`, `first`, `last`
//! - **logic** - `default`
//! - **encoding** - `urlEncode`, `htmlEscape`
//! - **date** - `date`
//!
//! # Usage
//!
//! Each module provides a function that returns a [`Module`] which can be
//! installed into a [`FunctionRegistry`]:
//!
//! ```
//! use fith_registry::FunctionRegistry;
//!
//! let registry = FunctionRegistry::new();
//! registry.install(fith_modules::string::module());
//! assert!(registry.contains("upper"));
//!
//! // Or everything at once
//! fith_modules::install_builtins(&registry);
//! assert!(registry.contains("date"));
//! ```

pub mod collections;
pub mod date;
pub mod encoding;
pub mod logic;
pub mod string;

use fith_registry::{FunctionRegistry, Module};

/// Every built-in module.
pub fn builtins() -> Vec<Module> {
    vec![
        string::module(),
        collections::module(),
        logic::module(),
        encoding::module(),
        date::module(),
    ]
}

/// Install every built-in module into `registry`.
pub fn install_builtins(registry: &FunctionRegistry) {
    for module in builtins() {
        registry.install(module);
    }
}
