//! Fith Registry
//!
//! The function registry templates call into, plus the [`Module`] builder
//! used to install bundles of functions and helpers for validating
//! arguments inside native functions.

pub mod args;
mod module;
mod native_fn;
mod registry;

pub use module::Module;
pub use native_fn::{NativeCallable, NativeFn};
pub use registry::{CallError, FunctionRegistry};

pub use fith_core::{FunctionError, Value};
