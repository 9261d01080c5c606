pub mod bindings;
pub mod literal;

pub use bindings::VariableBindings;

use crate::Result;
use crate::ast::{
    CASE_NORMALIZATION, Comparison, Conjunction, Function, Identifier, Literal, Node, Operator,
    ValueNode,
};
use crate::dialect::Dialect;
use crate::error::{InvalidKind, QueryError};
use crate::resolve::Resolved;
use crate::types::TypeTag;
use crate::value::Value;
use crate::visitor::{DepthGuard, Visitor};
use log::debug;

pub const DEFAULT_MAX_DEPTH: usize = 64;

// `IN ()` is not valid SQL; a list holding only NULL matches no row.
const EMPTY_LIST: &str = "(NULL)";

/// Rendering switches.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Splice variable values into the SQL as literals instead of emitting placeholders.
    pub inline_variables: bool,
    /// Maximum nesting of comparisons and conjunctions.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline_variables: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn inline_variables(mut self, inline: bool) -> Self {
        self.inline_variables = inline;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Output of a render: the SQL fragment and the values for its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<(String, Value)>,
    /// Verbatim fragments spliced from literal nodes, in output order.
    pub verbatim: Vec<String>,
}

/// Renders a resolved tree.
pub fn render(
    resolved: Resolved,
    dialect: &dyn Dialect,
    bindings: &dyn VariableBindings,
    options: &RenderOptions,
) -> Result<Rendered> {
    let mut renderer = Renderer::new(dialect, bindings, options);
    resolved.into_node().accept(&mut renderer)?;
    Ok(renderer.finish())
}

/// Visitor writing SQL into a buffer. Each visit returns the node it rendered, with
/// comparisons in their normalized operand order.
///
/// Every error aborts the render. Callers drop the renderer on error, so no partial SQL
/// escapes.
pub struct Renderer<'a> {
    dialect: &'a dyn Dialect,
    bindings: &'a dyn VariableBindings,
    options: &'a RenderOptions,
    out: Rendered,
    depth: DepthGuard,
    in_list: bool,
    fold_case: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(
        dialect: &'a dyn Dialect,
        bindings: &'a dyn VariableBindings,
        options: &'a RenderOptions,
    ) -> Self {
        Self {
            dialect,
            bindings,
            options,
            out: Rendered::default(),
            depth: DepthGuard::new(options.max_depth),
            in_list: false,
            fold_case: false,
        }
    }

    pub fn finish(self) -> Rendered {
        self.out
    }

    fn push(&mut self, sql: &str) {
        self.out.sql.push_str(sql);
    }

    /// Renders an operand, wrapped in the operator's preprocessing function if any.
    fn operand(&mut self, node: Box<Node>, op: Operator) -> Result<Box<Node>> {
        let Some(function) = op.preprocessing_function() else {
            return Ok(Box::new((*node).accept(self)?));
        };
        self.push(function);
        self.push("(");
        self.fold_case = function == CASE_NORMALIZATION;
        let node = (*node).accept(self);
        self.fold_case = false;
        self.push(")");
        Ok(Box::new(node?))
    }

    /// Applies case normalization ahead of time to constants and parameters, so operands
    /// differing only in case render identically.
    fn fold(&self, value: Value) -> Value {
        if !self.fold_case {
            return value;
        }
        match value {
            Value::Str(s) => Value::Str(s.to_uppercase()),
            Value::Char(c) => Value::Str(c.to_uppercase().collect()),
            Value::List(items) => Value::List(items.into_iter().map(|v| self.fold(v)).collect()),
            other => other,
        }
    }

    /// Whether an operand stands for SQL NULL: a null constant or a variable bound to null.
    fn is_null_operand(&self, node: &Node) -> bool {
        let Node::Value(value) = node else {
            return false;
        };
        match value.variable_name() {
            Some(name) => matches!(self.bindings.resolve(name), Some(Value::Null)),
            None => value.raw().is_null(),
        }
    }

    fn write_value(&mut self, value: &Value, tag: TypeTag, node: &ValueNode) -> Result<Value> {
        let coerced = literal::coerce(value, tag).map_err(|kind| QueryError::invalid(kind, node))?;
        let coerced = self.fold(coerced);
        let formatted = literal::format_value(&coerced, self.dialect);
        match &coerced {
            Value::List(items) if items.is_empty() && self.in_list => self.push(EMPTY_LIST),
            Value::List(_) => self.push(&formatted),
            _ if self.in_list => {
                self.push("(");
                self.push(&formatted);
                self.push(")");
            }
            _ => self.push(&formatted),
        }
        Ok(coerced)
    }

    fn bind(&mut self, name: &str, value: Value) {
        let seq = self.out.params.len() + 1;
        let placeholder = self.dialect.placeholder(seq, name);
        self.push(&placeholder);
        self.out.params.push((name.to_string(), value));
    }
}

impl Visitor for Renderer<'_> {
    fn visit_comparison(&mut self, node: Comparison) -> Result<Node> {
        self.depth.enter(&node)?;
        if node.op.is_boolean() || node.op == Operator::Func {
            return Err(QueryError::invalid(
                InvalidKind::UnsupportedOperator(node.op.to_string()),
                &node,
            ));
        }
        let node = node.normalized();
        let description = node.to_string();
        let Comparison { left, right, op } = node;

        let single = left.is_none() || right.is_none();
        let null_check = match (&left, &right) {
            (Some(_), Some(r)) => self.is_null_operand(r),
            _ => true,
        };
        let (left, right) = if null_check {
            let keyword = match op {
                Operator::Eq => " IS NULL",
                Operator::Ne => " IS NOT NULL",
                _ if single => {
                    return Err(QueryError::invalid(
                        InvalidKind::MissingOperand,
                        description,
                    ));
                }
                _ => {
                    return Err(QueryError::invalid(
                        InvalidKind::NullOperand(op.to_string()),
                        description,
                    ));
                }
            };
            let operand = left.or(right).ok_or_else(|| {
                QueryError::InternalConsistency(format!("comparison without operands: {}", description))
            })?;
            let operand = (*operand).accept(self)?;
            self.push(keyword);
            (Some(Box::new(operand)), None)
        } else {
            let (Some(left), Some(right)) = (left, right) else {
                return Err(QueryError::invalid(InvalidKind::MissingOperand, description));
            };
            let left = self.operand(left, op)?;
            self.push(" ");
            self.push(op.token());
            self.push(" ");
            self.in_list = op == Operator::In;
            let right = self.operand(right, op);
            self.in_list = false;
            (Some(left), Some(right?))
        };

        self.depth.leave();
        Ok(Node::Comparison(Comparison { left, right, op }))
    }

    fn visit_conjunction(&mut self, node: Conjunction) -> Result<Node> {
        self.depth.enter(&node)?;
        let Conjunction { left, right, op } = node;
        let left = match (left, op) {
            (None, Operator::Not) => {
                self.push("NOT (");
                None
            }
            (Some(left), Operator::And | Operator::Or) => {
                self.push("(");
                let left = (*left).accept(self)?;
                self.push(") ");
                self.push(op.token());
                self.push(" (");
                Some(Box::new(left))
            }
            (left, op) => {
                return Err(QueryError::InternalConsistency(format!(
                    "conjunction '{}' with{} left operand",
                    op,
                    if left.is_some() { "" } else { "out" }
                )));
            }
        };
        let right = (*right).accept(self)?;
        self.push(")");
        self.depth.leave();
        Ok(Node::Conjunction(Conjunction {
            left,
            right: Box::new(right),
            op,
        }))
    }

    fn visit_function(&mut self, node: Function) -> Result<Node> {
        Err(QueryError::invalid(
            InvalidKind::UnsupportedFunction(node.name().to_string()),
            &node,
        ))
    }

    fn visit_identifier(&mut self, node: Identifier) -> Result<Node> {
        if node.type_tag().is_none() {
            return Err(QueryError::InternalConsistency(format!(
                "identifier `{}` reached rendering without a resolved type",
                node
            )));
        }
        let column = self.dialect.identifier(node.name());
        self.push(&column);
        Ok(Node::Identifier(node))
    }

    fn visit_literal(&mut self, node: Literal) -> Result<Node> {
        debug!("Render: splicing verbatim fragment `{}`", node.text());
        self.push(node.text());
        self.out.verbatim.push(node.text().to_string());
        Ok(Node::Literal(node))
    }

    fn visit_value(&mut self, node: ValueNode) -> Result<Node> {
        let Some(tag) = node.type_tag() else {
            return Err(QueryError::InternalConsistency(format!(
                "value `{}` reached rendering without a resolved type",
                node
            )));
        };
        let Some(name) = node.variable_name() else {
            self.write_value(node.raw(), tag, &node)?;
            return Ok(Node::Value(node));
        };

        let bound = self.bindings.resolve(name).ok_or_else(|| {
            QueryError::invalid(InvalidKind::UnboundVariable(name.to_string()), &node)
        })?;
        if self.options.inline_variables {
            self.write_value(&bound, tag, &node)?;
            return Ok(Node::Value(node));
        }

        let coerced = literal::coerce(&bound, tag).map_err(|kind| QueryError::invalid(kind, &node))?;
        match self.fold(coerced) {
            Value::List(items) if self.in_list => {
                if items.is_empty() {
                    self.push(EMPTY_LIST);
                } else {
                    self.push("(");
                    for (i, item) in items.into_iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.bind(name, item);
                    }
                    self.push(")");
                }
            }
            value if self.in_list => {
                self.push("(");
                self.bind(name, value);
                self.push(")");
            }
            value => self.bind(name, value),
        }
        Ok(Node::Value(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::resolve::resolve;
    use std::collections::HashMap;

    fn schema() -> HashMap<String, TypeTag> {
        HashMap::from([
            ("age".to_string(), TypeTag::Long),
            ("name".to_string(), TypeTag::String),
            ("born".to_string(), TypeTag::Date),
        ])
    }

    fn sql(tree: Node, bindings: &dyn VariableBindings) -> Result<Rendered> {
        let resolved = resolve(tree, &schema())?;
        render(resolved, &AnsiDialect, bindings, &RenderOptions::default())
    }

    fn id(name: &str) -> Node {
        Node::identifier(name).unwrap()
    }

    #[test]
    fn test_swapped_operands_render_like_normalized() {
        let swapped = Node::compare(Node::value(5), Operator::Lt, id("age")).unwrap();
        let plain = Node::compare(id("age"), Operator::Gt, Node::value(5)).unwrap();
        let a = sql(swapped, &()).unwrap();
        let b = sql(plain, &()).unwrap();
        assert_eq!(a.sql, "age > 5");
        assert_eq!(a, b);
    }

    #[test]
    fn test_like_normalizes_case_on_both_sides() {
        let tree = Node::compare(id("name"), Operator::Like, Node::value("bob%")).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "UPPER(name) LIKE UPPER('BOB%')");
    }

    #[test]
    fn test_like_operands_differing_in_case_render_identically() {
        let like = |pattern: &str| {
            let tree = Node::compare(id("name"), Operator::Like, Node::value(pattern)).unwrap();
            sql(tree, &()).unwrap()
        };
        assert_eq!(like("bob"), like("Bob"));
        assert_eq!(like("bob"), like("BOB"));

        let bound = |pattern: &str| {
            let bindings = HashMap::from([("p".to_string(), Value::Str(pattern.to_string()))]);
            let tree = Node::compare(id("name"), Operator::Like, Node::variable(":p").unwrap())
                .unwrap();
            sql(tree, &bindings).unwrap()
        };
        assert_eq!(bound("bob").sql, "UPPER(name) LIKE UPPER(?)");
        assert_eq!(bound("bob"), bound("Bob"));
    }

    #[test]
    fn test_case_is_kept_outside_like() {
        let tree = Node::compare(id("name"), Operator::Eq, Node::value("Bob")).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "name = 'Bob'");
    }

    #[test]
    fn test_null_comparisons() {
        let tree = Node::compare(id("name"), Operator::Eq, Node::value(Value::Null)).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "name IS NULL");

        let tree = Node::comparison(None, Some(id("name")), Operator::Ne).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "name IS NOT NULL");

        let tree = Node::comparison(Some(id("age")), None, Operator::Gt).unwrap();
        let err = sql(tree, &()).unwrap_err();
        assert_eq!(err.invalid_kind(), Some(&InvalidKind::MissingOperand));
    }

    #[test]
    fn test_ordering_against_null() {
        let bindings = HashMap::from([("x".to_string(), Value::Null)]);
        let tree = Node::compare(id("age"), Operator::Gt, Node::variable(":x").unwrap()).unwrap();
        let err = sql(tree, &bindings).unwrap_err();
        assert_eq!(
            err.invalid_kind(),
            Some(&InvalidKind::NullOperand(">".to_string()))
        );

        let tree = Node::compare(id("name"), Operator::Like, Node::value(Value::Null)).unwrap();
        let err = sql(tree, &()).unwrap_err();
        assert_eq!(
            err.invalid_kind(),
            Some(&InvalidKind::NullOperand("LIKE".to_string()))
        );
    }

    #[test]
    fn test_variable_bound_to_null() {
        let bindings = HashMap::from([("who".to_string(), Value::Null)]);
        let tree = Node::compare(id("name"), Operator::Ne, Node::variable(":who").unwrap()).unwrap();
        let out = sql(tree, &bindings).unwrap();
        assert_eq!(out.sql, "name IS NOT NULL");
        assert!(out.params.is_empty());
    }

    #[test]
    fn test_variables_become_parameters() {
        let bindings = HashMap::from([("min".to_string(), Value::Str("18".to_string()))]);
        let tree = Node::compare(id("age"), Operator::Ge, Node::variable(":min").unwrap()).unwrap();
        let out = sql(tree, &bindings).unwrap();
        assert_eq!(out.sql, "age >= ?");
        assert_eq!(out.params, vec![("min".to_string(), Value::I64(18))]);
    }

    #[test]
    fn test_inline_variables() {
        let bindings = HashMap::from([("min".to_string(), Value::I32(18))]);
        let tree = Node::compare(id("age"), Operator::Ge, Node::variable(":min").unwrap()).unwrap();
        let resolved = resolve(tree, &schema()).unwrap();
        let options = RenderOptions::default().inline_variables(true);
        let out = render(resolved, &AnsiDialect, &bindings, &options).unwrap();
        assert_eq!(out.sql, "age >= 18");
        assert!(out.params.is_empty());
    }

    #[test]
    fn test_in_lists() {
        let tree = Node::compare(id("age"), Operator::In, Node::value(vec![1, 2, 3])).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "age IN (1, 2, 3)");

        let bindings = HashMap::from([(
            "ages".to_string(),
            Value::List(vec![Value::I32(1), Value::I32(2)]),
        )]);
        let tree = Node::compare(id("age"), Operator::In, Node::variable(":ages").unwrap()).unwrap();
        let out = sql(tree, &bindings).unwrap();
        assert_eq!(out.sql, "age IN (?, ?)");
        assert_eq!(out.params.len(), 2);

        let bindings = HashMap::from([("ages".to_string(), Value::List(vec![]))]);
        let tree = Node::compare(id("age"), Operator::In, Node::variable(":ages").unwrap()).unwrap();
        assert_eq!(sql(tree, &bindings).unwrap().sql, "age IN (NULL)");

        let tree = Node::compare(id("age"), Operator::In, Node::value(4)).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "age IN (4)");
    }

    #[test]
    fn test_conjunctions_are_parenthesized() {
        let tree = Node::or(
            Node::and(
                Node::compare(id("age"), Operator::Gt, Node::value(1)).unwrap(),
                Node::compare(id("age"), Operator::Lt, Node::value(9)).unwrap(),
            )
            .unwrap(),
            Node::not(Node::compare(id("name"), Operator::Eq, Node::value("x")).unwrap()).unwrap(),
        )
        .unwrap();
        assert_eq!(
            sql(tree, &()).unwrap().sql,
            "((age > 1) AND (age < 9)) OR (NOT (name = 'x'))"
        );
    }

    #[test]
    fn test_literal_is_spliced_and_reported() {
        let tree = Node::compare(id("born"), Operator::Gt, Node::literal("CURRENT_DATE").unwrap())
            .unwrap();
        let out = sql(tree, &()).unwrap();
        assert_eq!(out.sql, "born > CURRENT_DATE");
        assert_eq!(out.verbatim, vec!["CURRENT_DATE".to_string()]);
    }

    #[test]
    fn test_dates_are_formatted_by_type() {
        let tree = Node::compare(id("born"), Operator::Ge, Node::value("2000-01-31")).unwrap();
        assert_eq!(sql(tree, &()).unwrap().sql, "born >= DATE '2000-01-31'");
    }

    #[test]
    fn test_type_mismatch_is_query_invalid() {
        let tree = Node::compare(id("age"), Operator::Eq, Node::value("old")).unwrap();
        let err = sql(tree, &()).unwrap_err();
        assert!(matches!(
            err.invalid_kind(),
            Some(InvalidKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_functions_are_rejected() {
        let tree = Node::compare(
            Node::function("lower", vec![id("name")]).unwrap(),
            Operator::Eq,
            Node::value("x"),
        )
        .unwrap();
        let err = sql(tree, &()).unwrap_err();
        assert_eq!(
            err.invalid_kind(),
            Some(&InvalidKind::UnsupportedFunction("lower".to_string()))
        );
    }

    #[test]
    fn test_unresolved_nodes_are_internal_errors() {
        let tree = Node::compare(id("age"), Operator::Eq, Node::value(1)).unwrap();
        let options = RenderOptions::default();
        let mut renderer = Renderer::new(&AnsiDialect, &(), &options);
        let err = tree.accept(&mut renderer).unwrap_err();
        assert!(matches!(err, QueryError::InternalConsistency(_)));

        // a value with no identifier to borrow a type from
        let tree = Node::compare(Node::value(1), Operator::Eq, Node::value(1)).unwrap();
        let err = sql(tree, &()).unwrap_err();
        assert!(matches!(err, QueryError::InternalConsistency(_)));
    }

    #[test]
    fn test_boolean_operator_in_comparison() {
        let tree = Node::compare(id("age"), Operator::And, Node::value(1)).unwrap();
        let err = sql(tree, &()).unwrap_err();
        assert_eq!(
            err.invalid_kind(),
            Some(&InvalidKind::UnsupportedOperator("AND".to_string()))
        );
    }

    #[test]
    fn test_depth_guard() {
        let mut tree = Node::compare(id("age"), Operator::Eq, Node::value(1)).unwrap();
        for _ in 0..10 {
            tree = Node::not(tree).unwrap();
        }
        let resolved = resolve(tree, &schema()).unwrap();
        let options = RenderOptions::default().max_depth(5);
        let err = render(resolved, &AnsiDialect, &(), &options).unwrap_err();
        assert_eq!(err.invalid_kind(), Some(&InvalidKind::TooDeep(5)));
    }

    #[test]
    fn test_depth_guard_on_deep_tree() {
        let mut tree = Node::compare(id("age"), Operator::Eq, Node::value(1)).unwrap();
        for _ in 0..2000 {
            tree = Node::not(tree).unwrap();
        }
        let options = RenderOptions::default();
        let mut renderer = Renderer::new(&AnsiDialect, &(), &options);
        let err = tree.accept(&mut renderer).unwrap_err();
        assert_eq!(
            err.invalid_kind(),
            Some(&InvalidKind::TooDeep(DEFAULT_MAX_DEPTH))
        );
    }

    #[test]
    fn test_render_returns_normalized_tree() {
        let tree = Node::compare(Node::value(5), Operator::Le, id("age")).unwrap();
        let resolved = resolve(tree, &schema()).unwrap();
        let options = RenderOptions::default();
        let mut renderer = Renderer::new(&AnsiDialect, &(), &options);
        let out = resolved.into_node().accept(&mut renderer).unwrap();
        assert_eq!(out.to_string(), "age >= 5");
        assert_eq!(renderer.finish().sql, "age >= 5");
    }
}
