//! Argument validation helpers for native functions.
//!
//! Positions in error messages are 1-based.

use fith_core::{FunctionError, Value};

/// Require exactly `expected` arguments.
pub fn expect_arity(function: &str, args: &[Value], expected: usize) -> Result<(), FunctionError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(FunctionError::arity(function, expected, args.len()))
    }
}

/// The string argument at 0-based `index`.
pub fn str_arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a str, FunctionError> {
    let value = arg(function, args, index)?;
    value
        .as_str()
        .ok_or_else(|| FunctionError::type_mismatch(function, index + 1, "string", value.kind_name()))
}

/// The integer argument at 0-based `index`.
pub fn int_arg(function: &str, args: &[Value], index: usize) -> Result<i64, FunctionError> {
    let value = arg(function, args, index)?;
    value
        .as_int()
        .ok_or_else(|| FunctionError::type_mismatch(function, index + 1, "int", value.kind_name()))
}

/// The sequence argument at 0-based `index`.
pub fn seq_arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a [Value], FunctionError> {
    match arg(function, args, index)? {
        Value::Seq(items) => Ok(items),
        other => Err(FunctionError::type_mismatch(
            function,
            index + 1,
            "sequence",
            other.kind_name(),
        )),
    }
}

fn arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a Value, FunctionError> {
    args.get(index)
        .ok_or_else(|| FunctionError::arity(function, index + 1, args.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch() {
        let err = expect_arity("f", &[Value::Null], 2).unwrap_err();
        assert_eq!(err.to_string(), "f: expected 2 argument(s), got 1");
    }

    #[test]
    fn typed_accessors() {
        let args = [Value::from("s"), Value::Int(3), Value::from(vec![1, 2])];
        assert_eq!(str_arg("f", &args, 0), Ok("s"));
        assert_eq!(int_arg("f", &args, 1), Ok(3));
        assert_eq!(seq_arg("f", &args, 2).map(<[Value]>::len), Ok(2));
    }

    #[test]
    fn type_mismatch_names_position_and_kinds() {
        let err = str_arg("upper", &[Value::Int(1)], 0).unwrap_err();
        assert_eq!(err.to_string(), "upper: argument 1 must be string, got int");
    }
}
