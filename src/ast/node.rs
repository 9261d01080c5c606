use crate::Result;
use crate::ast::name::{decode_name, encode_name};
use crate::ast::operator::Operator;
use crate::error::QueryError;
use crate::types::TypeTag;
use crate::value::{ToValue, Value};
use std::fmt;

/// Prefix marking a bind variable reference, as in `:minAge`.
pub const BIND_MARKER: char = ':';

/// One node of a content query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Identifier(Identifier),
    /// A constant operand or a bind variable, see [`ValueNode::variable`].
    Value(ValueNode),
    /// Verbatim back-end fragment. Never escaped, never typed.
    Literal(Literal),
    Function(Function),
    Comparison(Comparison),
    Conjunction(Conjunction),
}

/// Reference to a content property.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    name: String,
    type_tag: Option<TypeTag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueNode {
    raw: Value,
    type_tag: Option<TypeTag>,
    variable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub(crate) name: String,
    pub(crate) parameters: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub(crate) left: Option<Box<Node>>,
    pub(crate) right: Option<Box<Node>>,
    pub(crate) op: Operator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conjunction {
    pub(crate) left: Option<Box<Node>>,
    pub(crate) right: Box<Node>,
    pub(crate) op: Operator,
}

fn require_text(what: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(QueryError::InvalidArgument(format!(
            "{} must not be blank",
            what
        )));
    }
    Ok(())
}

impl Identifier {
    /// Builds an identifier from its wire-encoded name.
    pub fn new(encoded: &str) -> Result<Self> {
        let name = decode_name(encoded);
        require_text("identifier name", &name)?;
        Ok(Self {
            name,
            type_tag: None,
        })
    }

    /// Decoded property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name re-encoded for display.
    pub fn encoded_name(&self) -> String {
        encode_name(&self.name)
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        self.type_tag
    }

    /// Sets the type if it is still unresolved. Returns whether the tag was taken.
    pub(crate) fn assign_type(&mut self, tag: TypeTag) -> bool {
        if self.type_tag.is_some() {
            return false;
        }
        self.type_tag = Some(tag);
        true
    }
}

impl ValueNode {
    /// A constant operand. Any payload is accepted, including [`Value::Null`].
    pub fn new(raw: impl ToValue) -> Self {
        Self {
            raw: raw.to_value(),
            type_tag: None,
            variable: false,
        }
    }

    /// A constant that renders as an integer whatever the property type is.
    pub fn force_integer(raw: impl ToValue) -> Self {
        Self {
            raw: raw.to_value(),
            type_tag: Some(TypeTag::ForceInteger),
            variable: false,
        }
    }

    /// A bind variable. `reference` may carry the `:` marker.
    pub fn variable(reference: &str) -> Result<Self> {
        let name = reference.strip_prefix(BIND_MARKER).unwrap_or(reference);
        require_text("variable name", name)?;
        Ok(Self {
            raw: Value::Str(reference.to_string()),
            type_tag: None,
            variable: true,
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        self.type_tag
    }

    /// Variable name without the bind marker, `None` for constants.
    pub fn variable_name(&self) -> Option<&str> {
        if !self.variable {
            return None;
        }
        match &self.raw {
            Value::Str(s) => Some(s.strip_prefix(BIND_MARKER).unwrap_or(s)),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.variable
    }

    pub(crate) fn assign_type(&mut self, tag: TypeTag) -> bool {
        if self.type_tag.is_some() {
            return false;
        }
        self.type_tag = Some(tag);
        true
    }
}

impl Literal {
    pub fn new(text: &str) -> Result<Self> {
        require_text("literal text", text)?;
        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Function {
    pub fn new(name: &str, parameters: Vec<Node>) -> Result<Self> {
        require_text("function name", name)?;
        Ok(Self {
            name: name.to_string(),
            parameters,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Node] {
        &self.parameters
    }
}

impl Comparison {
    pub fn new(left: Option<Node>, right: Option<Node>, op: Operator) -> Result<Self> {
        if left.is_none() && right.is_none() {
            return Err(QueryError::InvalidArgument(format!(
                "comparison '{}' needs at least one operand",
                op
            )));
        }
        Ok(Self {
            left: left.map(Box::new),
            right: right.map(Box::new),
            op,
        })
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    /// Moves the property reference to the left, reversing the operator when the
    /// operands trade places. `5 < age` becomes `age > 5`.
    pub fn normalized(self) -> Self {
        let left_is_ref = self.left.as_deref().is_some_and(Node::is_reference);
        let right_is_ref = self.right.as_deref().is_some_and(Node::is_reference);
        if !left_is_ref && right_is_ref {
            Self {
                left: self.right,
                right: self.left,
                op: self.op.reverse(),
            }
        } else {
            self
        }
    }
}

impl Conjunction {
    pub fn new(left: Option<Node>, right: Node, op: Operator) -> Result<Self> {
        if !op.is_boolean() {
            return Err(QueryError::InvalidArgument(format!(
                "'{}' is not a boolean operator",
                op
            )));
        }
        if left.is_none() && op != Operator::Not {
            return Err(QueryError::InvalidArgument(format!(
                "'{}' requires a left operand",
                op
            )));
        }
        Ok(Self {
            left: left.map(Box::new),
            right: Box::new(right),
            op,
        })
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> &Node {
        &self.right
    }

    pub fn op(&self) -> Operator {
        self.op
    }
}

impl Node {
    pub fn identifier(encoded: &str) -> Result<Node> {
        Identifier::new(encoded).map(Node::Identifier)
    }

    pub fn value(raw: impl ToValue) -> Node {
        Node::Value(ValueNode::new(raw))
    }

    pub fn variable(reference: &str) -> Result<Node> {
        ValueNode::variable(reference).map(Node::Value)
    }

    pub fn literal(text: &str) -> Result<Node> {
        Literal::new(text).map(Node::Literal)
    }

    pub fn function(name: &str, parameters: Vec<Node>) -> Result<Node> {
        Function::new(name, parameters).map(Node::Function)
    }

    pub fn comparison(left: Option<Node>, right: Option<Node>, op: Operator) -> Result<Node> {
        Comparison::new(left, right, op).map(Node::Comparison)
    }

    /// `left op right` with both operands present.
    pub fn compare(left: Node, op: Operator, right: Node) -> Result<Node> {
        Node::comparison(Some(left), Some(right), op)
    }

    pub fn and(left: Node, right: Node) -> Result<Node> {
        Conjunction::new(Some(left), right, Operator::And).map(Node::Conjunction)
    }

    pub fn or(left: Node, right: Node) -> Result<Node> {
        Conjunction::new(Some(left), right, Operator::Or).map(Node::Conjunction)
    }

    pub fn not(right: Node) -> Result<Node> {
        Conjunction::new(None, right, Operator::Not).map(Node::Conjunction)
    }

    /// Operator carried by the node, `None` for operands.
    pub fn op(&self) -> Option<Operator> {
        match self {
            Node::Comparison(c) => Some(c.op),
            Node::Conjunction(c) => Some(c.op),
            Node::Function(_) => Some(Operator::Func),
            Node::Identifier(_) | Node::Value(_) | Node::Literal(_) => None,
        }
    }

    /// Property references are identifiers and function calls.
    pub fn is_reference(&self) -> bool {
        matches!(self, Node::Identifier(_) | Node::Function(_))
    }

    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Node::Identifier(i) => i.type_tag(),
            Node::Value(v) => v.type_tag(),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded_name())
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.raw, self.variable) {
            (Value::Str(reference), true) => f.write_str(reference),
            (raw, _) => write!(f, "{}", raw),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Nesting printed in full; deeper subtrees are shown as `...`.
const DISPLAY_DEPTH: usize = 32;

/// A node printed at a given nesting level.
struct Nested<'a>(&'a Node, usize);

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (node, depth) = (self.0, self.1);
        if depth >= DISPLAY_DEPTH {
            return f.write_str("...");
        }
        match node {
            Node::Identifier(n) => fmt::Display::fmt(n, f),
            Node::Value(n) => fmt::Display::fmt(n, f),
            Node::Literal(n) => fmt::Display::fmt(n, f),
            Node::Function(n) => n.write_nested(f, depth),
            Node::Comparison(n) => n.write_nested(f, depth),
            Node::Conjunction(n) => n.write_nested(f, depth),
        }
    }
}

impl Function {
    fn write_nested(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Nested(p, depth + 1))?;
        }
        f.write_str(")")
    }
}

impl Comparison {
    fn write_nested(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let left = self.left.as_deref().map(|n| Nested(n, depth + 1));
        let right = self.right.as_deref().map(|n| Nested(n, depth + 1));
        match (left, right) {
            (Some(l), Some(r)) => write!(f, "{} {} {}", l, self.op, r),
            (Some(l), None) => write!(f, "{} {}", l, self.op),
            (None, Some(r)) => write!(f, "{} {}", self.op, r),
            (None, None) => write!(f, "{}", self.op),
        }
    }
}

impl Conjunction {
    fn write_nested(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let right = Nested(&self.right, depth + 1);
        match &self.left {
            Some(l) => write!(f, "({}) {} ({})", Nested(l, depth + 1), self.op, right),
            None => write!(f, "{} ({})", self.op, right),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, 0)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, 0)
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, 0)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Nested(self, 0), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age() -> Node {
        Node::identifier("age").unwrap()
    }

    #[test]
    fn test_comparison_requires_an_operand() {
        for op in Operator::ALL {
            assert!(matches!(
                Comparison::new(None, None, op),
                Err(QueryError::InvalidArgument(_))
            ));
            assert!(Comparison::new(Some(age()), None, op).is_ok());
            assert!(Comparison::new(None, Some(Node::value(5)), op).is_ok());
            assert!(Comparison::new(Some(age()), Some(Node::value(5)), op).is_ok());
        }
    }

    #[test]
    fn test_conjunction_left_only_optional_for_not() {
        assert!(Conjunction::new(None, age(), Operator::And).is_err());
        assert!(Conjunction::new(None, age(), Operator::Or).is_err());
        assert!(Conjunction::new(None, age(), Operator::Not).is_ok());
        assert!(Conjunction::new(Some(age()), age(), Operator::Eq).is_err());
    }

    #[test]
    fn test_blank_names_rejected() {
        assert!(Identifier::new("  ").is_err());
        assert!(Literal::new("").is_err());
        assert!(Function::new(" ", vec![]).is_err());
        assert!(ValueNode::variable(":").is_err());
        assert!(ValueNode::variable("").is_err());
        assert!(Function::new("lower", vec![]).is_ok());
    }

    #[test]
    fn test_value_accepts_null() {
        let v = ValueNode::new(Value::Null);
        assert!(v.raw().is_null());
        assert_eq!(v.variable_name(), None);
    }

    #[test]
    fn test_variable_strips_marker() {
        let v = ValueNode::variable(":minAge").unwrap();
        assert_eq!(v.variable_name(), Some("minAge"));
        assert_eq!(v.raw(), &Value::Str(":minAge".to_string()));
        let v = ValueNode::variable("limit").unwrap();
        assert_eq!(v.variable_name(), Some("limit"));
    }

    #[test]
    fn test_identifier_decodes_wire_name() {
        let id = Identifier::new("first_x0020_name").unwrap();
        assert_eq!(id.name(), "first name");
        assert_eq!(id.to_string(), "first_x0020_name");
    }

    #[test]
    fn test_op() {
        assert_eq!(age().op(), None);
        assert_eq!(Node::value(1).op(), None);
        assert_eq!(Node::function("f", vec![]).unwrap().op(), Some(Operator::Func));
        let c = Node::compare(age(), Operator::Ge, Node::value(1)).unwrap();
        assert_eq!(c.op(), Some(Operator::Ge));
        assert_eq!(Node::not(c).unwrap().op(), Some(Operator::Not));
    }

    #[test]
    fn test_normalized_swaps_and_reverses() {
        let c = Comparison::new(Some(Node::value(5)), Some(age()), Operator::Lt).unwrap();
        let n = c.normalized();
        assert_eq!(n.left(), Some(&age()));
        assert_eq!(n.right(), Some(&Node::value(5)));
        assert_eq!(n.op(), Operator::Gt);

        // already normalized, or no reference on either side
        let c = Comparison::new(Some(age()), Some(Node::value(5)), Operator::Lt).unwrap();
        assert_eq!(c.clone().normalized(), c);
        let c = Comparison::new(Some(Node::value(1)), Some(Node::value(5)), Operator::Lt).unwrap();
        assert_eq!(c.clone().normalized(), c);
    }

    #[test]
    fn test_display() {
        let tree = Node::and(
            Node::compare(age(), Operator::Gt, Node::value(5)).unwrap(),
            Node::not(Node::compare(
                Node::identifier("name").unwrap(),
                Operator::Like,
                Node::variable(":name").unwrap(),
            )
            .unwrap())
            .unwrap(),
        )
        .unwrap();
        assert_eq!(tree.to_string(), "(age > 5) AND (NOT (name LIKE :name))");
    }

    #[test]
    fn test_display_elides_deep_subtrees() {
        let mut tree = Node::compare(age(), Operator::Eq, Node::value(1)).unwrap();
        for _ in 0..2000 {
            tree = Node::not(tree).unwrap();
        }
        let shown = tree.to_string();
        assert!(shown.starts_with("NOT (NOT ("));
        assert!(shown.contains("..."));
        assert!(!shown.contains("age"));
    }
}
