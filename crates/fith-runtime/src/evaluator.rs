//! Tree-walking evaluator.
//!
//! Walks an AST in order, appending to a single output buffer. Composition
//! (`extends`, `block`, `include`) lives in the `composition` module; this
//! module covers plain nodes and expressions.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use fith_compiler::{CompiledTemplate, TemplateLoader};
use fith_core::{EvalError, Span, Value};
use fith_parser::Template;
use fith_parser::ast::{CallExpr, Expr, IfNode, IncludeParam, Node, RangeNode};
use fith_registry::{CallError, FunctionRegistry};

use crate::{Context, ops};

/// Zero-based iteration index inside `range`.
pub const LOOP_INDEX: &str = "@index";
/// `true` on the first iteration.
pub const LOOP_FIRST: &str = "@first";
/// `true` on the last iteration.
pub const LOOP_LAST: &str = "@last";

/// Block overrides in effect: block name to replacement body.
pub(crate) type Blocks<'t> = FxHashMap<&'t str, &'t [Node]>;

/// Options that affect a single render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Unresolved variables are errors when set; otherwise they render as
    /// null (empty output).
    pub strict_variables: bool,
    /// Maximum number of nested includes.
    pub max_include_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strict_variables: true,
            max_include_depth: 100,
        }
    }
}

/// Renders templates against a [`Context`].
///
/// An evaluator holds the per-render include stack, so each concurrent
/// render needs its own. The registry and loader are shared.
pub struct Evaluator<'a> {
    pub(crate) registry: &'a FunctionRegistry,
    pub(crate) loader: &'a dyn TemplateLoader,
    pub(crate) options: RenderOptions,
    /// Names of the templates being rendered, outermost first. The first
    /// entry is the root template; the rest are active includes.
    pub(crate) stack: Vec<String>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        registry: &'a FunctionRegistry,
        loader: &'a dyn TemplateLoader,
        options: RenderOptions,
    ) -> Self {
        Self {
            registry,
            loader,
            options,
            stack: Vec::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a compiled template.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn render(&mut self, compiled: &CompiledTemplate, ctx: &mut Context) -> Result<String, EvalError> {
        self.render_named(&compiled.name, &compiled.ast, ctx)
    }

    /// Render a template AST under `name`.
    ///
    /// On failure nothing is returned; the partial output is dropped.
    pub fn render_named(
        &mut self,
        name: &str,
        template: &Template,
        ctx: &mut Context,
    ) -> Result<String, EvalError> {
        debug!(template = name, "rendering");
        let mut out = String::new();
        self.stack.clear();
        self.stack.push(name.to_string());
        let result = self.render_template(name, template, ctx, &mut out);
        self.stack.clear();
        result.map_err(|e| e.in_template(name))?;
        Ok(out)
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub(crate) fn render_nodes(
        &mut self,
        nodes: &[Node],
        blocks: &Blocks<'_>,
        ctx: &mut Context,
        out: &mut String,
    ) -> Result<(), EvalError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(&text.text),
                Node::Output(expr) => out.push_str(&self.eval(expr, ctx)?.to_string()),
                Node::If(node) => self.render_if(node, blocks, ctx, out)?,
                Node::Range(node) => self.render_range(node, blocks, ctx, out)?,
                Node::Include(node) => self.render_include(node, ctx, out)?,
                Node::Block(node) => {
                    let body = blocks.get(node.name.as_str()).copied().unwrap_or(&node.body);
                    self.render_nodes(body, blocks, ctx, out)?;
                }
                // Only meaningful as the first significant node, where it is
                // handled before any node renders.
                Node::Extends(_) => {}
            }
        }
        Ok(())
    }

    fn render_if(
        &mut self,
        node: &IfNode,
        blocks: &Blocks<'_>,
        ctx: &mut Context,
        out: &mut String,
    ) -> Result<(), EvalError> {
        if self.eval(&node.condition, ctx)?.is_truthy() {
            self.render_nodes(&node.then_body, blocks, ctx, out)
        } else if let Some(else_body) = &node.else_body {
            self.render_nodes(else_body, blocks, ctx, out)
        } else {
            Ok(())
        }
    }

    fn render_range(
        &mut self,
        node: &RangeNode,
        blocks: &Blocks<'_>,
        ctx: &mut Context,
        out: &mut String,
    ) -> Result<(), EvalError> {
        let entries: Vec<(Option<String>, Value)> = match self.eval(&node.collection, ctx)? {
            Value::Seq(items) => items.into_iter().map(|item| (None, item)).collect(),
            Value::Map(entries) => entries.into_iter().map(|(k, v)| (Some(k), v)).collect(),
            other => {
                return Err(EvalError::NotIterable {
                    kind: other.kind_name(),
                    span: node.collection.span(),
                });
            }
        };

        if entries.is_empty() {
            if let Some(else_body) = &node.else_body {
                return self.render_nodes(else_body, blocks, ctx, out);
            }
            return Ok(());
        }

        let last = entries.len() - 1;
        for (index, (key, value)) in entries.into_iter().enumerate() {
            let mut scope = ctx.push_scope();
            scope.set(node.value_var.as_str(), value);
            if let (Some(key_var), Some(key)) = (&node.key_var, key) {
                scope.set(key_var.as_str(), key);
            }
            scope.set(LOOP_INDEX, index);
            scope.set(LOOP_FIRST, index == 0);
            scope.set(LOOP_LAST, index == last);
            self.render_nodes(&node.body, blocks, &mut scope, out)?;
        }
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Evaluate an expression to a value.
    pub fn eval(&self, expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(lit) => Ok(lit.kind.to_value()),
            Expr::Variable(var) => self.lenient(ctx.get(&var.path, var.span)),
            Expr::Binary(bin) => {
                let left = self.eval(&bin.left, ctx)?;
                let right = self.eval(&bin.right, ctx)?;
                ops::binary(bin.op, &left, &right, bin.span)
            }
            Expr::Unary(un) => {
                let operand = self.eval(&un.operand, ctx)?;
                ops::unary(un.op, &operand, un.span)
            }
            Expr::Index(idx) => {
                let object = self.eval(&idx.object, ctx)?;
                let index = self.eval(&idx.index, ctx)?;
                object.get_index(&index, idx.span)
            }
            Expr::Call(call) => self.eval_call(call, ctx),
            Expr::Pipe(pipe) => {
                let mut value = self.eval(&pipe.value, ctx)?;
                for filter in &pipe.filters {
                    value = self.call_function(&filter.name, &[value], filter.span)?;
                }
                Ok(value)
            }
        }
    }

    fn eval_call(&self, call: &CallExpr, ctx: &Context) -> Result<Value, EvalError> {
        if call.is_loop_binding() {
            return self.lenient(ctx.get(std::slice::from_ref(&call.name), call.span));
        }
        let args = call
            .args
            .iter()
            .map(|arg| self.eval(arg, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        self.call_function(&call.name, &args, call.span)
    }

    fn call_function(&self, name: &str, args: &[Value], span: Span) -> Result<Value, EvalError> {
        self.registry.call(name, args).map_err(|err| match err {
            CallError::UnknownFunction { name } => EvalError::UnknownFunction { name, span },
            CallError::Function(cause) => EvalError::Function {
                name: name.to_string(),
                cause,
                span,
            },
        })
    }

    /// Unresolved variables become null outside strict mode.
    fn lenient(&self, result: Result<Value, EvalError>) -> Result<Value, EvalError> {
        match result {
            Err(EvalError::UndefinedVariable { .. }) if !self.options.strict_variables => Ok(Value::Null),
            other => other,
        }
    }

    /// Evaluate include parameters into a fresh mapping.
    pub(crate) fn eval_params(
        &self,
        params: &[IncludeParam],
        ctx: &Context,
    ) -> Result<Value, EvalError> {
        let mut map = BTreeMap::new();
        for param in params {
            map.insert(param.name.clone(), self.eval(&param.value, ctx)?);
        }
        Ok(Value::Map(map))
    }
}

impl std::fmt::Debug for Evaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("options", &self.options)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}
