pub mod name;
pub mod node;
pub mod operator;

pub use node::{
    BIND_MARKER, Comparison, Conjunction, Function, Identifier, Literal, Node, ValueNode,
};
pub use operator::{CASE_NORMALIZATION, Operator};
