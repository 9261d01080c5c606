use crate::value::Value;
use std::collections::HashMap;

/// Values for the bind variables of a query, looked up by name at render time.
///
/// `None` means the variable is unbound. A variable bound to [`Value::Null`] is bound.
pub trait VariableBindings {
    fn resolve(&self, name: &str) -> Option<Value>;
}

/// Nothing is bound.
impl VariableBindings for () {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl VariableBindings for HashMap<String, Value> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// A map root, as produced by `#[derive(Bindings)]` or [`crate::value::to_value`].
/// Supports dotted paths (`user.name`) and falls back from camelCase to snake_case.
impl VariableBindings for Value {
    fn resolve(&self, name: &str) -> Option<Value> {
        lookup(self, name).cloned()
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    // 1) Try an exact match (a direct key on the root object).
    if let Some(v) = get_from_scope(root, key) {
        return Some(v);
    }

    // 2) Try dotted-path lookup (e.g. "user.name").
    let (head, rest) = key.split_once('.')?;
    let head_value = get_from_scope(root, head)?;
    resolve_path(head_value, rest)
}

fn get_from_scope<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    let Value::Map(m) = root else {
        return None;
    };
    if let Some(v) = m.get(key) {
        return Some(v);
    }
    to_snake_case(key).and_then(|snake| m.get(&snake))
}

/// Resolve a dot-separated path within a `Value` (maps only).
fn resolve_path<'a>(mut current: &'a Value, path: &str) -> Option<&'a Value> {
    for part in path.split('.') {
        current = get_from_scope(current, part)?;
    }
    Some(current)
}

/// Converts a camelCase string to snake_case.
/// Returns None if the string does not contain uppercase letters (no conversion needed).
fn to_snake_case(s: &str) -> Option<String> {
    if !s.chars().any(|c| c.is_uppercase()) {
        return None;
    }

    let mut snake = String::with_capacity(s.len() + 2);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    Some(snake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_simple() {
        let root = Value::Map(HashMap::from([("a".to_string(), Value::I64(1))]));
        assert_eq!(root.resolve("a"), Some(Value::I64(1)));
        assert_eq!(root.resolve("b"), None);
    }

    #[test]
    fn test_bound_null_is_bound() {
        let root = Value::Map(HashMap::from([("a".to_string(), Value::Null)]));
        assert_eq!(root.resolve("a"), Some(Value::Null));
    }

    #[test]
    fn test_lookup_nested() {
        let sub = Value::Map(HashMap::from([("b".to_string(), Value::I64(2))]));
        let root = Value::Map(HashMap::from([("a".to_string(), sub)]));

        assert_eq!(root.resolve("a.b"), Some(Value::I64(2)));
        assert_eq!(root.resolve("a.c"), None);
        assert_eq!(root.resolve("x.y"), None);
    }

    #[test]
    fn test_lookup_exact_match_with_dot() {
        let root = Value::Map(HashMap::from([("a.b".to_string(), Value::I64(3))]));
        assert_eq!(root.resolve("a.b"), Some(Value::I64(3)));
    }

    #[test]
    fn test_lookup_camel_to_snake() {
        let sub = Value::Map(HashMap::from([(
            "first_name".to_string(),
            Value::Str("John".to_string()),
        )]));
        let root = Value::Map(HashMap::from([
            ("min_age".to_string(), Value::U64(18)),
            ("user_profile".to_string(), sub),
        ]));

        assert_eq!(root.resolve("minAge"), Some(Value::U64(18)));
        assert_eq!(
            root.resolve("userProfile.firstName"),
            Some(Value::Str("John".to_string()))
        );
    }

    #[test]
    fn test_non_map_root_binds_nothing() {
        assert_eq!(Value::I64(1).resolve("a"), None);
        assert_eq!(().resolve("a"), None);
    }
}
