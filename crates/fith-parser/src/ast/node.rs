//! Template-level AST nodes.
//!
//! A [`Template`] is a flat list of [`Node`]s; control constructs own their
//! bodies, so each template is a strict tree. Cycles can only appear across
//! templates through `include` and `extends`.

use crate::ast::Expr;
use fith_core::Span;

/// The default binding for a range element.
pub const RANGE_VALUE_VAR: &str = ".";

/// The binding for a mapping key inside a range.
pub const RANGE_KEY_VAR: &str = "@key";

/// A template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Verbatim text
    Text(TextNode),
    /// An output action: `{{ expr }}`
    Output(Expr),
    /// `{{if}} ... {{else}} ... {{end}}`
    If(IfNode),
    /// `{{range}} ... {{else}} ... {{end}}`
    Range(RangeNode),
    /// `{{include "name" ...}}`
    Include(IncludeNode),
    /// `{{extends "name"}}`
    Extends(ExtendsNode),
    /// `{{block "name"}} ... {{end}}`
    Block(BlockNode),
}

impl Node {
    /// Get the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Text(n) => n.span,
            Node::Output(e) => e.span(),
            Node::If(n) => n.span,
            Node::Range(n) => n.span,
            Node::Include(n) => n.span,
            Node::Extends(n) => n.span,
            Node::Block(n) => n.span,
        }
    }

    /// Whether this node is text consisting only of whitespace.
    pub fn is_whitespace_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.text.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfNode {
    pub condition: Expr,
    pub then_body: Vec<Node>,
    pub else_body: Option<Vec<Node>>,
    pub span: Span,
}

/// A loop over a sequence or mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeNode {
    /// Name the element is bound to, [`RANGE_VALUE_VAR`].
    pub value_var: String,
    /// Name the mapping key is bound to, [`RANGE_KEY_VAR`].
    pub key_var: Option<String>,
    pub collection: Expr,
    pub body: Vec<Node>,
    /// Rendered when the collection is empty.
    pub else_body: Option<Vec<Node>>,
    pub span: Span,
}

/// An include directive.
///
/// `params` and `context` are normally exclusive; when both were written,
/// `context` takes precedence at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeNode {
    pub name: String,
    pub params: Vec<IncludeParam>,
    pub context: Option<Expr>,
    pub span: Span,
}

/// A `key=value` include parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeParam {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendsNode {
    pub parent: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub name: String,
    pub body: Vec<Node>,
    pub span: Span,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub nodes: Vec<Node>,
}

impl Template {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// The `extends` directive, if it is the first significant node.
    ///
    /// Leading whitespace-only text is skipped; any other node first means
    /// the template does not extend anything.
    pub fn extends(&self) -> Option<&ExtendsNode> {
        match self.nodes.iter().find(|n| !n.is_whitespace_text()) {
            Some(Node::Extends(ext)) => Some(ext),
            _ => None,
        }
    }

    /// Visit every node in the tree, depth first, in source order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        walk_nodes(&self.nodes, f);
    }
}

/// Visit `nodes` and all nested bodies, depth first, in source order.
pub fn walk_nodes<'a>(nodes: &'a [Node], f: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        f(node);
        match node {
            Node::If(n) => {
                walk_nodes(&n.then_body, f);
                if let Some(else_body) = &n.else_body {
                    walk_nodes(else_body, f);
                }
            }
            Node::Range(n) => {
                walk_nodes(&n.body, f);
                if let Some(else_body) = &n.else_body {
                    walk_nodes(else_body, f);
                }
            }
            Node::Block(n) => walk_nodes(&n.body, f),
            Node::Text(_) | Node::Output(_) | Node::Include(_) | Node::Extends(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text(TextNode {
            text: s.to_string(),
            span: Span::default(),
        })
    }

    fn extends(parent: &str) -> Node {
        Node::Extends(ExtendsNode {
            parent: parent.to_string(),
            span: Span::default(),
        })
    }

    #[test]
    fn extends_after_whitespace() {
        let template = Template::new(vec![text("\n  "), extends("base")]);
        assert_eq!(template.extends().map(|e| e.parent.as_str()), Some("base"));
    }

    #[test]
    fn extends_after_content_is_ignored() {
        let template = Template::new(vec![text("hi"), extends("base")]);
        assert!(template.extends().is_none());
    }

    #[test]
    fn walk_visits_nested_bodies() {
        let block = Node::Block(BlockNode {
            name: "content".into(),
            body: vec![text("a"), text("b")],
            span: Span::default(),
        });
        let template = Template::new(vec![block, text("c")]);

        let mut count = 0;
        template.walk(&mut |_| count += 1);
        assert_eq!(count, 4);
    }
}
