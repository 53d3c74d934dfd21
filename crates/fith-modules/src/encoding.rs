//! Encoding functions: `urlEncode` and `htmlEscape`.
//!
//! The engine never escapes output on its own; templates opt in by calling
//! these explicitly.

use fith_core::{FunctionError, Value};
use fith_registry::Module;
use fith_registry::args::{expect_arity, str_arg};

/// Creates the encoding module.
pub fn module() -> Module {
    Module::new("encoding")
        .function("urlEncode", url_encode)
        .function("htmlEscape", html_escape)
}

/// Query-string encoding: everything except unreserved characters
/// (`A-Z a-z 0-9 - _ . ~`) is percent-encoded and spaces become `+`.
pub fn url_encode(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("urlEncode", args, 1)?;
    let encoded = urlencoding::encode(str_arg("urlEncode", args, 0)?);
    // A literal '%' is encoded as %25, so every %20 came from a space.
    Ok(encoded.replace("%20", "+").into())
}

/// Escape `<`, `>`, `&`, `'` and `"`.
pub fn html_escape(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("htmlEscape", args, 1)?;
    let s = str_arg("htmlEscape", args, 0)?;

    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            c => out.push(c),
        }
    }
    Ok(out.into())
}
