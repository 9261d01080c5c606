use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// Case normalization applied to both operands of a `LIKE` comparison.
pub const CASE_NORMALIZATION: &str = "UPPER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Gt,
    Ge,
    Eq,
    Ne,
    Le,
    Lt,
    Like,
    And,
    Or,
    Not,
    Func,
    In,
}

/// One catalog entry. Entries are only built through [`entry`], which rejects
/// empty tokens and empty preprocessing function names.
struct OperatorEntry {
    op: Operator,
    token: &'static str,
    reverse: Operator,
    preprocess: Option<&'static str>,
}

const fn entry(
    op: Operator,
    token: &'static str,
    reverse: Operator,
    preprocess: Option<&'static str>,
) -> OperatorEntry {
    assert!(!token.is_empty(), "operator token must not be empty");
    if let Some(name) = preprocess {
        assert!(
            !name.is_empty(),
            "preprocessing function name must not be empty"
        );
    }
    OperatorEntry {
        op,
        token,
        reverse,
        preprocess,
    }
}

// Indexed by discriminant. Evaluated at compile time, so the reverse pairing is
// complete before any caller can observe it.
static CATALOG: [OperatorEntry; 12] = [
    entry(Operator::Gt, ">", Operator::Lt, None),
    entry(Operator::Ge, ">=", Operator::Le, None),
    entry(Operator::Eq, "=", Operator::Eq, None),
    entry(Operator::Ne, "<>", Operator::Ne, None),
    entry(Operator::Le, "<=", Operator::Ge, None),
    entry(Operator::Lt, "<", Operator::Gt, None),
    entry(Operator::Like, "LIKE", Operator::Like, Some(CASE_NORMALIZATION)),
    entry(Operator::And, "AND", Operator::And, None),
    entry(Operator::Or, "OR", Operator::Or, None),
    entry(Operator::Not, "NOT", Operator::Not, None),
    entry(Operator::Func, "FUNC", Operator::Func, None),
    entry(Operator::In, "IN", Operator::In, None),
];

impl Operator {
    pub const ALL: [Operator; 12] = [
        Operator::Gt,
        Operator::Ge,
        Operator::Eq,
        Operator::Ne,
        Operator::Le,
        Operator::Lt,
        Operator::Like,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Func,
        Operator::In,
    ];

    fn entry_of(self) -> &'static OperatorEntry {
        let entry = &CATALOG[self as usize];
        debug_assert_eq!(entry.op, self);
        entry
    }

    /// Rendered form of the operator.
    pub fn token(self) -> &'static str {
        self.entry_of().token
    }

    /// The operator that keeps the meaning when the operands are swapped.
    pub fn reverse(self) -> Operator {
        self.entry_of().reverse
    }

    /// Scalar function applied to both operands before comparing, if any.
    pub fn preprocessing_function(self) -> Option<&'static str> {
        self.entry_of().preprocess
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Gt => "GT",
            Operator::Ge => "GE",
            Operator::Eq => "EQ",
            Operator::Ne => "NE",
            Operator::Le => "LE",
            Operator::Lt => "LT",
            Operator::Like => "LIKE",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Func => "FUNC",
            Operator::In => "IN",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Ge | Operator::Le | Operator::Lt
        )
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.token().eq_ignore_ascii_case(s) || op.name().eq_ignore_ascii_case(s))
            .or(match s {
                "!=" => Some(Operator::Ne),
                "==" => Some(Operator::Eq),
                _ => None,
            })
            .ok_or_else(|| QueryError::InvalidArgument(format!("Unknown operator: {}", s)))
    }
}
