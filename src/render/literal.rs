//! Type-directed conversion and spelling of operand values.

use crate::dialect::Dialect;
use crate::error::InvalidKind;
use crate::types::TypeTag;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Converts `value` to the canonical representation for `tag`.
///
/// Lists are converted element-wise and [`Value::Null`] passes through for every tag.
pub fn coerce(value: &Value, tag: TypeTag) -> Result<Value, InvalidKind> {
    let mismatch = || InvalidKind::TypeMismatch {
        value: value.to_string(),
        expected: tag.to_string(),
    };
    match value {
        Value::Null => return Ok(Value::Null),
        Value::List(items) => {
            return items
                .iter()
                .map(|item| coerce(item, tag))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List);
        }
        _ => {}
    }
    let converted = match tag {
        TypeTag::String | TypeTag::Reference => to_text(value).map(Value::Str),
        TypeTag::Long => to_long(value).map(Value::I64),
        TypeTag::ForceInteger => to_forced_integer(value).map(Value::I64),
        TypeTag::Double => to_double(value).map(Value::F64),
        TypeTag::Decimal => to_decimal(value).map(Value::Decimal),
        TypeTag::Boolean => to_bool(value).map(Value::Bool),
        TypeTag::Date => to_date(value).map(Value::Date),
        TypeTag::DateTime => to_datetime(value).map(Value::DateTime),
        TypeTag::Binary => to_bytes(value).map(Value::Bytes),
    };
    converted.ok_or_else(mismatch)
}

/// Spells an already coerced value as a literal of the dialect.
pub fn format_value(value: &Value, dialect: &dyn Dialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => dialect.bool_literal(*b),
        Value::Char(c) => dialect.quote_string(&c.to_string()),
        Value::Str(s) => dialect.quote_string(s),
        Value::F32(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        Value::Bytes(b) => dialect.bytes_literal(b),
        Value::Date(d) => dialect.date_literal(*d),
        Value::DateTime(dt) => dialect.datetime_literal(*dt),
        Value::DateTimeUtc(dt) => dialect.datetime_literal(dt.naive_utc()),
        Value::Decimal(d) => d.to_string(),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(|v| format_value(v, dialect)).collect();
            format!("({})", parts.join(", "))
        }
        Value::Map(_) => dialect.quote_string(&value.to_string()),
        _ => value
            .as_i64()
            .map(|n| n.to_string())
            .unwrap_or_else(|| value.to_string()),
    }
}

fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.clone()),
        Value::Char(c) => Some(c.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
        Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
        Value::DateTime(dt) => Some(dt.format(DATETIME_FORMATS[0]).to_string()),
        Value::DateTimeUtc(dt) => Some(dt.to_rfc3339()),
        Value::Decimal(d) => Some(d.to_string()),
        Value::F32(_) | Value::F64(_) => value.as_f64().map(|n| n.to_string()),
        Value::Map(_) | Value::List(_) | Value::Null => None,
        _ => value.as_i64().map(|n| n.to_string()),
    }
}

fn to_long(value: &Value) -> Option<i64> {
    match value {
        Value::Str(s) => s.trim().parse().ok(),
        Value::F32(_) | Value::F64(_) => value
            .as_f64()
            .filter(|n| n.is_finite() && n.fract() == 0.0)
            .and_then(float_to_i64),
        Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
        _ => value.as_i64(),
    }
}

fn to_forced_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Str(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_i64))
        }
        Value::F32(_) | Value::F64(_) => value.as_f64().and_then(float_to_i64),
        Value::Decimal(d) => d.trunc().to_i64(),
        _ => value.as_i64(),
    }
}

fn float_to_i64(n: f64) -> Option<i64> {
    let n = n.trunc();
    (n.is_finite() && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

fn to_double(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Str(s) => s.trim().parse().ok(),
        Value::Decimal(d) => d.to_f64(),
        _ => value.as_f64(),
    }?;
    n.is_finite().then_some(n)
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::Str(s) => Decimal::from_str(s.trim()).ok(),
        Value::F32(_) | Value::F64(_) => value.as_f64().and_then(|n| Decimal::try_from(n).ok()),
        _ => value.as_i64().map(Decimal::from),
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Str(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::Str(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => match value.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
    }
}

fn to_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::DateTimeUtc(dt) => Some(dt.naive_utc().date()),
        Value::Str(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .or_else(|| parse_datetime(s).map(|dt| dt.date()))
        }
        _ => None,
    }
}

fn to_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::DateTimeUtc(dt) => Some(dt.naive_utc()),
        Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Value::Str(s) => {
            let s = s.trim();
            parse_datetime(s).or_else(|| {
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
        }
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn to_bytes(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.clone()),
        Value::Str(s) => Some(s.as_bytes().to_vec()),
        _ => None,
    }
}
