use crate::dialect::Dialect;
use chrono::{NaiveDate, NaiveDateTime};

/// MySQL quotes identifiers with backticks and treats backslash as an escape character
/// inside string literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDialect;

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn placeholder(&self, _param_seq: usize, _param_name: &str) -> String {
        "?".to_string()
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("'{}'", d.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.6f"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_quoting() {
        let d = MysqlDialect;
        assert_eq!(d.identifier("first name"), "`first name`");
        assert_eq!(d.identifier("order"), "`order`");
        assert_eq!(d.quote_string("a\\'b"), "'a\\\\''b'");
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(d.datetime_literal(dt), "'2024-01-02 03:04:05.000000'");
    }
}
