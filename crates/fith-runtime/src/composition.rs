//! Template composition: `extends`, `block` and `include`.
//!
//! # Inheritance
//!
//! A template whose first significant node is `extends` renders nothing of
//! its own. Its `block` definitions are collected into an override table,
//! then the parent is rendered in its place. Chains are followed to the
//! top-most ancestor; a block defined by a descendant takes precedence over
//! the same block defined further up, so the most-derived override wins.
//! While the ancestor renders, each `block` node renders its override if one
//! exists, else its own default body.
//!
//! # Includes
//!
//! `include` renders another template inline. The included template sees:
//! - the value of its context expression as the root, if one is given
//! - otherwise a fresh mapping of its named parameters, if any
//! - otherwise the includer's context, unchanged
//!
//! Includes are tracked on a stack so a template cannot include itself
//! transitively, and the stack depth is capped.

use std::sync::Arc;

use tracing::trace;

use fith_core::EvalError;
use fith_parser::Template;
use fith_parser::ast::{IncludeNode, Node, walk_nodes};

use crate::Context;
use crate::evaluator::{Blocks, Evaluator};

impl Evaluator<'_> {
    /// Render `template`, known as `name`, resolving any inheritance chain.
    pub(crate) fn render_template(
        &mut self,
        name: &str,
        template: &Template,
        ctx: &mut Context,
        out: &mut String,
    ) -> Result<(), EvalError> {
        let mut chain = vec![name.to_string()];
        self.render_inherited(template, Blocks::default(), &mut chain, ctx, out)
    }

    fn render_inherited<'t>(
        &mut self,
        template: &'t Template,
        mut blocks: Blocks<'t>,
        chain: &mut Vec<String>,
        ctx: &mut Context,
        out: &mut String,
    ) -> Result<(), EvalError> {
        let Some(extends) = template.extends() else {
            return self.render_nodes(&template.nodes, &blocks, ctx, out);
        };

        collect_blocks(&template.nodes, &mut blocks);

        let parent_name = extends.parent.as_str();
        if chain.iter().any(|n| n == parent_name) {
            return Err(EvalError::CircularExtends {
                name: parent_name.to_string(),
            });
        }
        trace!(parent = parent_name, depth = chain.len(), "resolving extends");

        let parent = self.load(parent_name)?;
        chain.push(parent_name.to_string());
        self.render_inherited(&parent, blocks, chain, ctx, out)
            .map_err(|e| e.in_template(parent_name))
    }

    pub(crate) fn render_include(
        &mut self,
        node: &IncludeNode,
        ctx: &mut Context,
        out: &mut String,
    ) -> Result<(), EvalError> {
        let name = node.name.as_str();
        if self.stack.iter().any(|n| n == name) {
            return Err(EvalError::CircularInclude {
                name: name.to_string(),
                stack: self.stack.clone(),
            });
        }
        let max = self.options.max_include_depth;
        if self.active_includes() >= max {
            return Err(EvalError::IncludeDepthExceeded {
                name: name.to_string(),
                max,
            });
        }

        let template = self.load(name)?;

        // An explicit context or params start a fresh scope chain, so
        // variables bound by the caller (`@template` included) are not visible.
        let mut own;
        let target: &mut Context = if let Some(expr) = &node.context {
            own = Context::new(self.eval(expr, ctx)?);
            &mut own
        } else if !node.params.is_empty() {
            own = Context::new(self.eval_params(&node.params, ctx)?);
            &mut own
        } else {
            ctx
        };

        trace!(template = name, depth = self.stack.len(), "including template");
        self.stack.push(name.to_string());
        let result = self.render_template(name, &template, target, out);
        self.stack.pop();
        result.map_err(|e| e.in_template(name))
    }

    /// Number of includes currently being rendered.
    fn active_includes(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    fn load(&self, name: &str) -> Result<Arc<Template>, EvalError> {
        self.loader.load(name).map_err(|source| EvalError::Load {
            name: name.to_string(),
            source,
        })
    }
}

/// Record every block in `nodes` that is not already overridden.
fn collect_blocks<'t>(nodes: &'t [Node], blocks: &mut Blocks<'t>) {
    walk_nodes(nodes, &mut |node| {
        if let Node::Block(block) = node {
            blocks.entry(block.name.as_str()).or_insert(block.body.as_slice());
        }
    });
}
