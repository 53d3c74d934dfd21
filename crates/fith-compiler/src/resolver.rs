//! Dependency resolution.
//!
//! Walks a template's AST for `include` and `extends` directives, loading
//! every referenced template once and recursing into it. The traversal
//! state (visited set, discovery order, graph) lives in a
//! [`DependencyResolver`] owned by a single compilation, so concurrent
//! compilations never share it.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: template names
//! - Edges: "references" (`include` or `extends`)

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use fith_core::{CompileError, LoadError};
use fith_parser::Template;
use fith_parser::ast::{Node, walk_nodes};

use crate::TemplateLoader;

/// The templates a compiled template depends on.
#[derive(Debug, Default)]
pub struct Dependencies {
    /// Each referenced template once, in first-discovery order.
    pub order: Vec<String>,
    graph: DiGraph<String, ()>,
    indices: FxHashMap<String, NodeIndex>,
}

impl Dependencies {
    /// Whether the reference graph contains a cycle.
    ///
    /// Cycles are legal at compile time (a template may conditionally
    /// include itself); the evaluator rejects them if they are reached.
    pub fn has_cycle(&self) -> bool {
        toposort(&self.graph, None).is_err()
    }

    /// A template that participates in a cycle, if any.
    pub fn cycle_member(&self) -> Option<&str> {
        toposort(&self.graph, None)
            .err()
            .map(|cycle| self.graph[cycle.node_id()].as_str())
    }
}

/// Resolves the transitive `include`/`extends` closure of a template.
pub struct DependencyResolver<'a> {
    loader: &'a dyn TemplateLoader,
    visited: FxHashSet<String>,
    deps: Dependencies,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(loader: &'a dyn TemplateLoader) -> Self {
        Self {
            loader,
            visited: FxHashSet::default(),
            deps: Dependencies::default(),
        }
    }

    /// Resolve every dependency of `template`, which is known as `name`.
    ///
    /// A missing target is an error that aborts resolution immediately.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(mut self, name: &str, template: &Template) -> Result<Dependencies, CompileError> {
        self.visited.insert(name.to_string());
        self.node_index(name);
        self.visit(name, template)?;

        if let Some(member) = self.deps.cycle_member() {
            warn!(template = name, cycle_member = member, "template dependency graph contains a cycle");
        }
        Ok(self.deps)
    }

    fn visit(&mut self, name: &str, template: &Template) -> Result<(), CompileError> {
        for target in references(&template.nodes) {
            let from = self.node_index(name);
            let to = self.node_index(&target);
            self.deps.graph.update_edge(from, to, ());

            if !self.visited.insert(target.clone()) {
                continue;
            }

            if !self.loader.exists(&target) {
                return Err(CompileError::TemplateNotFound { name: target });
            }
            let loaded = self.loader.load(&target).map_err(|source| match source {
                LoadError::NotFound { name } => CompileError::TemplateNotFound { name },
                source => CompileError::Load {
                    name: target.clone(),
                    source,
                },
            })?;

            trace!(template = name, dependency = %target, "discovered dependency");
            self.deps.order.push(target.clone());
            self.visit(&target, &loaded)?;
        }
        Ok(())
    }

    fn node_index(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.deps.indices.get(name) {
            return index;
        }
        let index = self.deps.graph.add_node(name.to_string());
        self.deps.indices.insert(name.to_string(), index);
        index
    }
}

/// Names referenced by `include`/`extends` anywhere in `nodes`, in source
/// order, including nested `if`/`range`/`block` bodies.
fn references(nodes: &[Node]) -> Vec<String> {
    let mut names = Vec::new();
    walk_nodes(nodes, &mut |node| match node {
        Node::Include(inc) => names.push(inc.name.clone()),
        Node::Extends(ext) => names.push(ext.parent.clone()),
        _ => {}
    });
    names
}
