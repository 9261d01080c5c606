use crate::dialect::Dialect;
use chrono::{NaiveDate, NaiveDateTime};

/// SQLite stores booleans as integers and dates as ISO-8601 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn placeholder(&self, _param_seq: usize, _param_name: &str) -> String {
        "?".to_string()
    }

    fn bool_literal(&self, b: bool) -> String {
        let literal = if b { "1" } else { "0" };
        literal.to_string()
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("'{}'", d.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f"))
    }
}
