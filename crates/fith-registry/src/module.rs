//! Function modules.
//!
//! A [`Module`] is a named bundle of native functions that is built up front
//! and installed into a [`FunctionRegistry`](crate::FunctionRegistry) in one
//! step:
//!
//! ```
//! use fith_core::Value;
//! use fith_registry::{FunctionRegistry, Module};
//!
//! let module = Module::new("demo").function("answer", |_| Ok(Value::Int(42)));
//!
//! let registry = FunctionRegistry::new();
//! registry.install(module);
//! assert_eq!(registry.call("answer", &[]).unwrap(), Value::Int(42));
//! ```

use fith_core::{FunctionError, Value};

use crate::NativeFn;

/// A named collection of native functions awaiting installation.
#[derive(Debug, Default)]
pub struct Module {
    name: String,
    functions: Vec<NativeFn>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Add a function under `name`. A later function with the same name
    /// replaces an earlier one on installation.
    pub fn function<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.functions.push(NativeFn::new(name, f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Names of the functions in this module, in insertion order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(NativeFn::name)
    }

    pub(crate) fn into_functions(self) -> Vec<NativeFn> {
        self.functions
    }
}
