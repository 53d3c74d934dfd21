//! Collection functions: `join`, `len`, `first` and `last`.

use fith_core::{FunctionError, Value};
use fith_registry::Module;
use fith_registry::args::{expect_arity, seq_arg, str_arg};

/// Creates the collections module.
pub fn module() -> Module {
    Module::new("collections")
        .function("join", join)
        .function("len", len)
        .function("first", first)
        .function("last", last)
}

/// `join seq sep`: display every element and join with `sep`.
pub fn join(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("join", args, 2)?;
    let items = seq_arg("join", args, 0)?;
    let sep = str_arg("join", args, 1)?;
    let parts: Vec<String> = items.iter().map(Value::to_string).collect();
    Ok(parts.join(sep).into())
}

/// Length of a string (in characters), sequence or mapping.
pub fn len(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("len", args, 1)?;
    args[0]
        .len()
        .map(Value::from)
        .ok_or_else(|| {
            FunctionError::type_mismatch("len", 1, "string, sequence or mapping", args[0].kind_name())
        })
}

pub fn first(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("first", args, 1)?;
    seq_arg("first", args, 0)?
        .first()
        .cloned()
        .ok_or_else(|| FunctionError::invalid("first", "sequence is empty"))
}

pub fn last(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("last", args, 1)?;
    seq_arg("last", args, 0)?
        .last()
        .cloned()
        .ok_or_else(|| FunctionError::invalid("last", "sequence is empty"))
}
