//! Date functions: `date`.
//!
//! `date format value` formats a timestamp with a small token language:
//!
//! | Token  | Meaning                 |
//! |--------|-------------------------|
//! | `YYYY` | four-digit year         |
//! | `YY`   | two-digit year          |
//! | `MM`   | month, zero-padded      |
//! | `DD`   | day, zero-padded        |
//! | `hh`   | hour (24h), zero-padded |
//! | `mm`   | minute, zero-padded     |
//! | `ss`   | second, zero-padded     |
//!
//! Everything else is copied through. `value` is either a string in RFC 3339,
//! `YYYY-MM-DD` or `YYYY-MM-DD hh:mm:ss` form, or an integer Unix timestamp
//! in seconds (interpreted as UTC). RFC 3339 input is formatted in its own
//! offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use fith_core::{FunctionError, Value};
use fith_registry::Module;
use fith_registry::args::{expect_arity, str_arg};

/// Token to `chrono` format specifier, longest tokens first.
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("hh", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// Creates the date module.
pub fn module() -> Module {
    Module::new("date").function("date", date)
}

pub fn date(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("date", args, 2)?;
    let format = str_arg("date", args, 0)?;
    let timestamp = match &args[1] {
        Value::String(s) => parse(s)?,
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| FunctionError::invalid("date", format!("timestamp {secs} is out of range")))?,
        other => {
            return Err(FunctionError::type_mismatch(
                "date",
                2,
                "string or int",
                other.kind_name(),
            ));
        }
    };
    Ok(timestamp.format(&to_chrono_format(format)).to_string().into())
}

fn parse(s: &str) -> Result<NaiveDateTime, FunctionError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| FunctionError::invalid("date", format!("could not parse time string '{s}'")))
}

fn to_chrono_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut rest = format;
    'scan: while let Some(c) = rest.chars().next() {
        for (token, spec) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = after;
                continue 'scan;
            }
        }
        if c == '%' {
            out.push('%');
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
