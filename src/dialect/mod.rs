#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::ast::name::is_plain;
use chrono::{NaiveDate, NaiveDateTime};

/// Keywords that cannot stand as bare column names in the supported back ends.
const RESERVED_WORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "END", "EXISTS", "FALSE", "FOR", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN",
    "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT",
    "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT",
    "SET", "TABLE", "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USING", "VALUES",
    "WHEN", "WHERE", "WITH",
];

/// Whether `name` is a reserved SQL keyword, ignoring case.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
}

/// `Dialect` defines how rendered queries are spelled for one SQL back end.
///
/// A dialect is responsible for:
/// - Generating parameter placeholders
/// - Quoting identifiers and string literals
/// - Spelling boolean, date, timestamp and binary literals
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect.
    ///
    /// Example: "ansi", "mysql", "sqlite"
    fn name(&self) -> &str;

    /// Generates a placeholder string for a bound parameter.
    ///
    /// # Arguments
    /// * `param_seq` - The sequential index of the parameter (starting from 1)
    /// * `param_name` - The variable name the parameter was bound from
    ///
    /// Example outputs:
    /// - PostgreSQL: `$1`
    /// - MySQL / SQLite: `?`
    /// - Named parameters: `:param_name`
    fn placeholder(&self, param_seq: usize, param_name: &str) -> String;

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Column reference for a property name: bare when every character is plain and the
    /// name is not a reserved word, quoted otherwise.
    fn identifier(&self, name: &str) -> String {
        let plain = !is_reserved(name)
            && name
                .char_indices()
                .all(|(i, c)| c != ':' && c != '-' && c != '.' && is_plain(c, i == 0));
        if plain {
            name.to_string()
        } else {
            self.quote_identifier(name)
        }
    }

    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    fn bool_literal(&self, b: bool) -> String {
        let literal = if b { "TRUE" } else { "FALSE" };
        literal.to_string()
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("DATE '{}'", d.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", dt.format("%Y-%m-%d %H:%M:%S%.f"))
    }

    fn bytes_literal(&self, b: &[u8]) -> String {
        let mut out = String::with_capacity(b.len() * 2 + 3);
        out.push_str("X'");
        for byte in b {
            out.push_str(&format!("{:02X}", byte));
        }
        out.push('\'');
        out
    }
}

/// Standard SQL with `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &str {
        "ansi"
    }

    fn placeholder(&self, _param_seq: usize, _param_name: &str) -> String {
        "?".to_string()
    }
}
