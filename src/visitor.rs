//! Fold-style visitor over [`Node`] trees.
//!
//! Every `visit_*` method takes a node by value and returns the node that replaces it.
//! The defaults rebuild the node unchanged, recursing through the `walk_*` helpers, so
//! an implementation only overrides the kinds it cares about. Variables arrive through
//! [`Visitor::visit_value`]; use [`ValueNode::variable_name`] to tell them apart.

use crate::Result;
use crate::ast::{Comparison, Conjunction, Function, Identifier, Literal, Node, ValueNode};
use crate::error::{InvalidKind, QueryError};
use std::fmt;

pub trait Visitor {
    fn visit_comparison(&mut self, node: Comparison) -> Result<Node> {
        walk_comparison(self, node)
    }

    fn visit_conjunction(&mut self, node: Conjunction) -> Result<Node> {
        walk_conjunction(self, node)
    }

    fn visit_function(&mut self, node: Function) -> Result<Node> {
        walk_function(self, node)
    }

    fn visit_identifier(&mut self, node: Identifier) -> Result<Node> {
        Ok(Node::Identifier(node))
    }

    fn visit_literal(&mut self, node: Literal) -> Result<Node> {
        Ok(Node::Literal(node))
    }

    fn visit_value(&mut self, node: ValueNode) -> Result<Node> {
        Ok(Node::Value(node))
    }
}

impl Node {
    /// Hands the node to the visitor method matching its kind.
    pub fn accept<V: Visitor + ?Sized>(self, visitor: &mut V) -> Result<Node> {
        match self {
            Node::Identifier(n) => visitor.visit_identifier(n),
            Node::Value(n) => visitor.visit_value(n),
            Node::Literal(n) => visitor.visit_literal(n),
            Node::Function(n) => visitor.visit_function(n),
            Node::Comparison(n) => visitor.visit_comparison(n),
            Node::Conjunction(n) => visitor.visit_conjunction(n),
        }
    }
}

pub(crate) fn accept_boxed<V: Visitor + ?Sized>(
    node: Option<Box<Node>>,
    visitor: &mut V,
) -> Result<Option<Node>> {
    node.map(|n| (*n).accept(visitor)).transpose()
}

pub fn walk_comparison<V: Visitor + ?Sized>(visitor: &mut V, node: Comparison) -> Result<Node> {
    let Comparison { left, right, op } = node;
    let left = accept_boxed(left, visitor)?;
    let right = accept_boxed(right, visitor)?;
    Node::comparison(left, right, op)
}

pub fn walk_conjunction<V: Visitor + ?Sized>(visitor: &mut V, node: Conjunction) -> Result<Node> {
    let Conjunction { left, right, op } = node;
    let left = accept_boxed(left, visitor)?;
    let right = (*right).accept(visitor)?;
    Conjunction::new(left, right, op).map(Node::Conjunction)
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, node: Function) -> Result<Node> {
    let Function { name, parameters } = node;
    let parameters = parameters
        .into_iter()
        .map(|p| p.accept(visitor))
        .collect::<Result<Vec<_>>>()?;
    Ok(Node::Function(Function { name, parameters }))
}

/// Nesting counter for passes that recurse through the tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DepthGuard {
    depth: usize,
    max_depth: usize,
}

impl DepthGuard {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn enter(&mut self, node: &dyn fmt::Display) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(QueryError::invalid(InvalidKind::TooDeep(self.max_depth), node));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
