mod schema;

pub use schema::{PropertyTypes, SchemaLookup};

use crate::Result;
use crate::ast::{Comparison, Conjunction, Function, Identifier, Node};
use crate::error::{InvalidKind, QueryError};
use crate::render::DEFAULT_MAX_DEPTH;
use crate::types::TypeTag;
use crate::visitor::{DepthGuard, Visitor, accept_boxed, walk_conjunction, walk_function};
use log::trace;

/// A tree that went through [`resolve`]. Only this module can build one.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved(Node);

impl Resolved {
    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn into_node(self) -> Node {
        self.0
    }
}

/// Assigns property types to identifiers and carries them over to the operands they are
/// compared with. The tree keeps its shape; only type tags change.
pub fn resolve(tree: Node, schema: &dyn SchemaLookup) -> Result<Resolved> {
    resolve_bounded(tree, schema, DEFAULT_MAX_DEPTH)
}

/// Like [`resolve`], failing with [`InvalidKind::TooDeep`] once comparisons, conjunctions
/// and function calls nest deeper than `max_depth`.
pub fn resolve_bounded(tree: Node, schema: &dyn SchemaLookup, max_depth: usize) -> Result<Resolved> {
    let mut resolver = TypeResolver::new(schema).max_depth(max_depth);
    tree.accept(&mut resolver).map(Resolved)
}

pub struct TypeResolver<'a> {
    schema: &'a dyn SchemaLookup,
    depth: DepthGuard,
}

impl<'a> TypeResolver<'a> {
    pub fn new(schema: &'a dyn SchemaLookup) -> Self {
        Self {
            schema,
            depth: DepthGuard::new(DEFAULT_MAX_DEPTH),
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.depth = DepthGuard::new(max_depth);
        self
    }
}

impl Visitor for TypeResolver<'_> {
    fn visit_comparison(&mut self, node: Comparison) -> Result<Node> {
        self.depth.enter(&node)?;
        let Comparison { left, right, op } = node;
        let mut left = accept_boxed(left, self)?;
        let mut right = accept_boxed(right, self)?;
        propagate(left.as_ref(), right.as_mut());
        propagate(right.as_ref(), left.as_mut());
        self.depth.leave();
        Node::comparison(left, right, op)
    }

    fn visit_conjunction(&mut self, node: Conjunction) -> Result<Node> {
        self.depth.enter(&node)?;
        let node = walk_conjunction(self, node)?;
        self.depth.leave();
        Ok(node)
    }

    fn visit_function(&mut self, node: Function) -> Result<Node> {
        self.depth.enter(&node)?;
        let node = walk_function(self, node)?;
        self.depth.leave();
        Ok(node)
    }

    fn visit_identifier(&mut self, mut node: Identifier) -> Result<Node> {
        if node.type_tag().is_none() {
            let tag = self.schema.property_type(node.name()).ok_or_else(|| {
                QueryError::invalid(InvalidKind::UnknownProperty(node.name().to_string()), &node)
            })?;
            trace!("Resolve: property={}, type={}", node.name(), tag);
            node.assign_type(tag);
        }
        Ok(Node::Identifier(node))
    }
}

/// Copies the identifier type of `from` onto an untyped value in `to`.
fn propagate(from: Option<&Node>, to: Option<&mut Node>) {
    let tag: Option<TypeTag> = match from {
        Some(Node::Identifier(id)) => id.type_tag(),
        _ => None,
    };
    if let (Some(tag), Some(Node::Value(value))) = (tag, to) {
        value.assign_type(tag);
    }
}
