//! String functions: `upper`, `lower`, `title`, `trim`, `trimPrefix`,
//! `trimSuffix`, `truncate` and `replace`.

use fith_core::{FunctionError, Value};
use fith_registry::Module;
use fith_registry::args::{expect_arity, int_arg, str_arg};

/// Suffix appended by `truncate` when it shortens a string.
const ELLIPSIS: &str = "...";

/// Creates the string module.
pub fn module() -> Module {
    Module::new("string")
        .function("upper", upper)
        .function("lower", lower)
        .function("title", title)
        .function("trim", trim)
        .function("trimPrefix", trim_prefix)
        .function("trimSuffix", trim_suffix)
        .function("truncate", truncate)
        .function("replace", replace)
}

// =========================================================================
// CASE
// =========================================================================

pub fn upper(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("upper", args, 1)?;
    Ok(str_arg("upper", args, 0)?.to_uppercase().into())
}

pub fn lower(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("lower", args, 1)?;
    Ok(str_arg("lower", args, 0)?.to_lowercase().into())
}

/// Uppercase the first letter of every word. A word starts after any
/// character that is not alphanumeric or `_`.
pub fn title(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("title", args, 1)?;
    let s = str_arg("title", args, 0)?;

    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    Ok(out.into())
}

// =========================================================================
// TRIMMING
// =========================================================================

pub fn trim(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("trim", args, 1)?;
    Ok(str_arg("trim", args, 0)?.trim().into())
}

pub fn trim_prefix(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("trimPrefix", args, 2)?;
    let s = str_arg("trimPrefix", args, 0)?;
    let prefix = str_arg("trimPrefix", args, 1)?;
    Ok(s.strip_prefix(prefix).unwrap_or(s).into())
}

pub fn trim_suffix(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("trimSuffix", args, 2)?;
    let s = str_arg("trimSuffix", args, 0)?;
    let suffix = str_arg("trimSuffix", args, 1)?;
    Ok(s.strip_suffix(suffix).unwrap_or(s).into())
}

/// `truncate s n`: keep the first `n` characters, appending `...` when
/// anything was cut. Floats are truncated towards zero.
pub fn truncate(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("truncate", args, 2)?;
    let s = str_arg("truncate", args, 0)?;
    let max = match &args[1] {
        Value::Float(f) => *f as i64,
        _ => int_arg("truncate", args, 1)?,
    };
    let max = usize::try_from(max)
        .map_err(|_| FunctionError::invalid("truncate", "length must be non-negative"))?;

    match s.char_indices().nth(max) {
        Some((cut, _)) => Ok(format!("{}{ELLIPSIS}", &s[..cut]).into()),
        None => Ok(s.into()),
    }
}

pub fn replace(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("replace", args, 3)?;
    let s = str_arg("replace", args, 0)?;
    let from = str_arg("replace", args, 1)?;
    let to = str_arg("replace", args, 2)?;
    Ok(s.replace(from, to).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn case_conversion() {
        assert_eq!(upper(&[s("hello")]), Ok(s("HELLO")));
        assert_eq!(lower(&[s("HeLLo")]), Ok(s("hello")));
    }

    #[test]
    fn title_capitalizes_words() {
        assert_eq!(title(&[s("hello big-world")]), Ok(s("Hello Big-World")));
        assert_eq!(title(&[s("snake_case word")]), Ok(s("Snake_case Word")));
    }

    #[test]
    fn trimming() {
        assert_eq!(trim(&[s("  hi \n")]), Ok(s("hi")));
        assert_eq!(trim_prefix(&[s("v1.2"), s("v")]), Ok(s("1.2")));
        assert_eq!(trim_prefix(&[s("1.2"), s("v")]), Ok(s("1.2")));
        assert_eq!(trim_suffix(&[s("file.txt"), s(".txt")]), Ok(s("file")));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate(&[s("héllo world"), Value::Int(5)]), Ok(s("héllo...")));
        assert_eq!(truncate(&[s("short"), Value::Int(10)]), Ok(s("short")));
        assert_eq!(truncate(&[s("exact"), Value::Int(5)]), Ok(s("exact")));
        assert_eq!(truncate(&[s("abcdef"), Value::Float(2.9)]), Ok(s("ab...")));
    }

    #[test]
    fn truncate_rejects_negative_length() {
        let err = truncate(&[s("abc"), Value::Int(-1)]).unwrap_err();
        assert_eq!(err.to_string(), "truncate: length must be non-negative");
    }

    #[test]
    fn replace_all_occurrences() {
        assert_eq!(replace(&[s("a-b-c"), s("-"), s("+")]), Ok(s("a+b+c")));
    }

    #[test]
    fn argument_errors() {
        assert!(matches!(upper(&[]), Err(FunctionError::Arity { expected: 1, got: 0, .. })));
        assert!(matches!(
            upper(&[Value::Int(1)]),
            Err(FunctionError::Type { position: 1, .. })
        ));
        assert!(matches!(
            replace(&[s("a"), s("b"), Value::Null]),
            Err(FunctionError::Type { position: 3, found: "null", .. })
        ));
    }
}
