//! FunctionRegistry - thread-safe name to native function map.
//!
//! # Thread Safety
//!
//! The registry is shared by every render of an engine and functions may
//! still be registered while renders are in flight, so the map sits behind a
//! `parking_lot::RwLock`. Lookups take the read lock only long enough to
//! clone the function handle; the function itself runs unlocked.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::trace;

use fith_core::{FunctionError, Value};

use crate::{Module, NativeFn};

/// Why a registry call failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error(transparent)]
    Function(#[from] FunctionError),
}

/// Named native functions available to templates.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: RwLock<FxHashMap<String, NativeFn>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any existing function.
    pub fn register<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.insert(NativeFn::new(name, f));
    }

    /// Install every function of `module`.
    pub fn install(&self, module: Module) {
        trace!(module = module.name(), functions = module.len(), "installing module");
        let mut functions = self.functions.write();
        for f in module.into_functions() {
            functions.insert(f.name().to_string(), f);
        }
    }

    pub fn insert(&self, f: NativeFn) {
        self.functions.write().insert(f.name().to_string(), f);
    }

    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.functions.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.read().is_empty()
    }

    /// Call the function registered under `name`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        let f = self.get(name).ok_or_else(|| CallError::UnknownFunction {
            name: name.to_string(),
        })?;
        Ok(f.call(args)?)
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let functions = self.functions.read();
        let mut names: Vec<&str> = functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}
