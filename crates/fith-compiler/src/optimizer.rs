//! AST optimization pass.
//!
//! A single bottom-up pass that folds `if` nodes with a literal boolean
//! condition:
//! - `{{if true}}A{{else}}B{{end}}` becomes `A`
//! - `{{if false}}A{{else}}B{{end}}` becomes `B`
//! - `{{if false}}A{{end}}` disappears
//!
//! Multi-node branches are spliced into the enclosing node list. A branch
//! holding an `extends` directive is never spliced: the `if` stays in place
//! with its branches optimized, so folding cannot turn a conditional
//! `extends` into a leading one. Bodies of `range`, `block` and non-constant
//! `if` nodes are optimized recursively.
//! Running the pass twice yields the same AST as running it once.

use fith_parser::ast::{BlockNode, IfNode, Node, RangeNode};
use fith_parser::Template;

/// Optimize a whole template.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn optimize(template: Template) -> Template {
    Template::new(optimize_nodes(template.nodes))
}

/// Optimize a node list.
pub fn optimize_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        optimize_node(node, &mut out);
    }
    out
}

/// Optimize one node, appending whatever it becomes to `out`.
fn optimize_node(node: Node, out: &mut Vec<Node>) {
    match node {
        Node::If(if_node) => {
            let then_body = optimize_nodes(if_node.then_body);
            let else_body = if_node.else_body.map(optimize_nodes);
            match if_node.condition.as_bool_literal() {
                Some(true) if !holds_extends(&then_body) => out.extend(then_body),
                Some(false) if !else_body.as_deref().is_some_and(holds_extends) => {
                    out.extend(else_body.into_iter().flatten())
                }
                _ => out.push(Node::If(IfNode {
                    then_body,
                    else_body,
                    ..if_node
                })),
            }
        }
        Node::Range(range) => out.push(Node::Range(RangeNode {
            body: optimize_nodes(range.body),
            else_body: range.else_body.map(optimize_nodes),
            ..range
        })),
        Node::Block(block) => out.push(Node::Block(BlockNode {
            body: optimize_nodes(block.body),
            ..block
        })),
        other => out.push(other),
    }
}

fn holds_extends(nodes: &[Node]) -> bool {
    nodes.iter().any(|n| matches!(n, Node::Extends(_)))
}
