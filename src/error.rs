use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid Query: {0}")]
    InvalidQuery(InvalidQuery),
    #[error("Internal Consistency Error: {0}")]
    InternalConsistency(String),
    #[error("Serialization Error: {0}")]
    SerializationError(String),
}

/// Why a structurally valid tree was rejected during a pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidKind {
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),
    #[error("function '{0}' is not supported")]
    UnsupportedFunction(String),
    #[error("operator '{0}' is not supported in a comparison")]
    UnsupportedOperator(String),
    #[error("cannot convert {value} to {expected}")]
    TypeMismatch { value: String, expected: String },
    #[error("comparison is missing an operand")]
    MissingOperand,
    #[error("operator '{0}' cannot compare with NULL")]
    NullOperand(String),
    #[error("expression depth exceeds maximum of {0}")]
    TooDeep(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidQuery {
    pub kind: InvalidKind,
    /// Query-language form of the offending node.
    pub node: String,
}

impl fmt::Display for InvalidQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in `{}`", self.kind, self.node)
    }
}

impl QueryError {
    pub fn invalid(kind: InvalidKind, node: impl fmt::Display) -> Self {
        QueryError::InvalidQuery(InvalidQuery {
            kind,
            node: node.to_string(),
        })
    }

    pub fn invalid_kind(&self) -> Option<&InvalidKind> {
        match self {
            QueryError::InvalidQuery(q) => Some(&q.kind),
            _ => None,
        }
    }

    /// True for failures that reject the query as a whole rather than a malformed build.
    pub fn rejects_query(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidQuery(_) | QueryError::InternalConsistency(_)
        )
    }
}

impl serde::ser::Error for QueryError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        QueryError::SerializationError(msg.to_string())
    }
}
