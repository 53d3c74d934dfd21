//! Native function storage.

use std::fmt;
use std::sync::Arc;

use fith_core::{FunctionError, Value};

/// Signature every template function implements.
///
/// Functions receive their evaluated arguments in call order and validate
/// arity and kinds themselves.
pub type NativeCallable = dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync;

/// Type-erased, cheaply clonable native function.
#[derive(Clone)]
pub struct NativeFn {
    name: Arc<str>,
    inner: Arc<NativeCallable>,
}

impl NativeFn {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            inner: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn call(&self, args: &[Value]) -> Result<Value, FunctionError> {
        (self.inner)(args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_callable() {
        let f = NativeFn::new("double", |args| Ok(Value::Int(args[0].as_int().unwrap_or(0) * 2)));
        let g = f.clone();
        assert_eq!(g.name(), "double");
        assert_eq!(g.call(&[Value::Int(21)]), Ok(Value::Int(42)));
        assert_eq!(format!("{f:?}"), r#"NativeFn { name: "double", .. }"#);
    }
}
