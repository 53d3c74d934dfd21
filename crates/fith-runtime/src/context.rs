//! Render context: the root value plus a stack of loop scopes.
//!
//! `.` resolves to the innermost scope that binds it, falling back to the
//! root value. Names starting with `@` (loop bindings, `@template`) are only
//! ever found in scopes.
//!
//! Scopes are pushed with [`Context::push_scope`], which returns a
//! [`ScopeGuard`] that pops the scope when dropped. Early returns and `?`
//! therefore cannot leak a scope.

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

use fith_core::{EvalError, Span, Value};
use fith_parser::ast::CURRENT;

// ============================================================================
// Context
// ============================================================================

/// Data visible to a render.
///
/// Owned by exactly one in-flight render.
#[derive(Debug, Clone, Default)]
pub struct Context {
    root: Value,
    scopes: Vec<FxHashMap<String, Value>>,
}

impl Context {
    pub fn new(root: impl Into<Value>) -> Self {
        Self {
            root: root.into(),
            scopes: Vec::new(),
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Number of scopes currently pushed.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope, creating a base scope if none
    /// exists yet.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if self.scopes.is_empty() {
            self.scopes.push(FxHashMap::default());
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value.into());
        }
    }

    /// Push an empty scope that lives as long as the returned guard.
    pub fn push_scope(&mut self) -> ScopeGuard<'_> {
        self.scopes.push(FxHashMap::default());
        ScopeGuard { ctx: self }
    }

    /// Innermost binding of `name` in the scope stack.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// The value `.` currently refers to.
    pub fn current(&self) -> &Value {
        self.lookup(CURRENT).unwrap_or(&self.root)
    }

    /// Resolve a variable path such as `[".", "User", "Name"]`.
    ///
    /// Every segment after the first must resolve to a non-null value;
    /// the error names the first segment that does not.
    pub fn get(&self, path: &[String], span: Span) -> Result<Value, EvalError> {
        let Some((first, fields)) = path.split_first() else {
            return Err(EvalError::EmptyPath { span });
        };

        let mut current = if first == CURRENT {
            self.current()
        } else {
            self.lookup(first)
                .ok_or_else(|| undefined(first, path, span))?
        };

        for field in fields {
            current = match current.get_field(field) {
                Some(value) if !value.is_null() => value,
                _ => return Err(undefined(field, path, span)),
            };
        }
        Ok(current.clone())
    }
}

fn undefined(segment: &str, path: &[String], span: Span) -> EvalError {
    let path = match path.split_first() {
        Some((first, fields)) if first == CURRENT && !fields.is_empty() => {
            fields.iter().map(|f| format!(".{f}")).collect()
        }
        _ => path.join("."),
    };
    EvalError::UndefinedVariable {
        segment: segment.to_string(),
        path,
        span,
    }
}

// ============================================================================
// ScopeGuard
// ============================================================================

/// A pushed scope; popped on drop.
///
/// Dereferences to the [`Context`], so rendering code keeps using the
/// context through the guard while the scope is active.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    ctx: &'a mut Context,
}

impl Deref for ScopeGuard<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.ctx.scopes.pop();
    }
}
