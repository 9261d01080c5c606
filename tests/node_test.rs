use uquery::ast::name::{decode_name, encode_name};
use uquery::ast::{Comparison, Conjunction};
use uquery::{Node, Operator, QueryError};

fn id(name: &str) -> Node {
    Node::identifier(name).unwrap()
}

#[test]
fn test_comparison_needs_one_operand() {
    for op in Operator::ALL {
        let err = Comparison::new(None, None, op).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
        assert!(!err.rejects_query());

        assert!(Comparison::new(Some(id("a")), None, op).is_ok());
        assert!(Comparison::new(None, Some(Node::value(1)), op).is_ok());
        assert!(Comparison::new(Some(id("a")), Some(Node::value(1)), op).is_ok());
    }
}

#[test]
fn test_conjunction_left_operand_rules() {
    let leaf = || Node::compare(id("a"), Operator::Eq, Node::value(1)).unwrap();

    assert!(Conjunction::new(None, leaf(), Operator::And).is_err());
    assert!(Conjunction::new(None, leaf(), Operator::Or).is_err());
    assert!(Conjunction::new(None, leaf(), Operator::Not).is_ok());
    assert!(Conjunction::new(Some(leaf()), leaf(), Operator::And).is_ok());
    assert!(Conjunction::new(Some(leaf()), leaf(), Operator::Gt).is_err());
}

#[test]
fn test_plain_names_round_trip() {
    for name in ["age", "first_name", "a.b-c", "Größe"] {
        assert_eq!(decode_name(name), name);
        assert_eq!(encode_name(&decode_name(name)), name);
    }
}

#[test]
fn test_escaped_names_decode() {
    let node = id("first_x0020_name");
    let Node::Identifier(identifier) = &node else {
        panic!("expected identifier");
    };
    assert_eq!(identifier.name(), "first name");
    assert_eq!(identifier.encoded_name(), "first_x0020_name");
}

#[test]
fn test_display_uses_query_syntax() {
    let tree = Node::and(
        Node::compare(id("age"), Operator::Gt, Node::value(5)).unwrap(),
        Node::not(Node::compare(id("name"), Operator::Like, Node::variable(":name").unwrap()).unwrap())
            .unwrap(),
    )
    .unwrap();
    assert_eq!(tree.to_string(), "(age > 5) AND (NOT (name LIKE :name))");
}
