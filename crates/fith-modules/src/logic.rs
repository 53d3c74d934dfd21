//! Logic functions: `default`.

use fith_core::{FunctionError, Value};
use fith_registry::Module;
use fith_registry::args::expect_arity;

/// Creates the logic module.
pub fn module() -> Module {
    Module::new("logic").function("default", default)
}

/// `default value fallback`: `fallback` when `value` is null, `false`, zero,
/// an empty string or an empty sequence; otherwise `value`.
///
/// Empty mappings and records are kept.
pub fn default(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("default", args, 2)?;
    let value = &args[0];
    let is_empty = match value {
        Value::Map(_) | Value::Record(_) => false,
        other => !other.is_truthy(),
    };
    Ok(if is_empty { &args[1] } else { value }.clone())
}
