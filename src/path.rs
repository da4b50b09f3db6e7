//! Dot-path access over schema-less JSON values.
//!
//! Paths are dot-delimited key sequences like `meta.taskId`. Only objects
//! are traversable; an absent value is a normal outcome, not an error.
//! Writes create intermediate objects on demand and silently overwrite any
//! non-object value found along the way.

use serde_json::{Map, Value};

/// Reads the value at `path`, or `None` if any segment is missing or the
/// value under a non-final segment is not an object.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let map = current.as_object()?;
        match segments.peek() {
            None => return map.get(segment),
            Some(_) => current = map.get(segment)?,
        }
    }
    None
}

/// Writes `value` at `path`, creating intermediate objects as needed.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let map = match current {
            Value::Object(map) => map,
            _ => return,
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_gets_nested_value() {
        let root = json!({"a": {"b": {"c": 42}}});
        assert_eq!(get(&root, "a.b.c"), Some(&json!(42)));
    }

    #[test]
    fn test_gets_top_level_value() {
        let root = json!({"status": "success"});
        assert_eq!(get(&root, "status"), Some(&json!("success")));
    }

    #[test]
    fn test_missing_segment_is_absent() {
        let root = json!({"a": {"b": 1}});
        assert_eq!(get(&root, "a.x"), None);
        assert_eq!(get(&root, "x.b"), None);
    }

    #[test]
    fn test_non_object_segment_is_absent() {
        let root = json!({"a": "flat", "list": [1, 2, 3]});
        assert_eq!(get(&root, "a.b"), None);
        assert_eq!(get(&root, "list.0"), None);
    }

    #[test]
    fn test_explicit_null_is_present() {
        let root = json!({"a": {"b": null}});
        assert_eq!(get(&root, "a.b"), Some(&Value::Null));
    }

    #[test]
    fn test_sets_nested_value_creating_intermediates() {
        let mut root = json!({});
        set(&mut root, "a.b.c", json!("deep"));
        assert_eq!(root, json!({"a": {"b": {"c": "deep"}}}));
        assert_eq!(get(&root, "a.b"), Some(&json!({"c": "deep"})));
    }

    #[test]
    fn test_set_preserves_siblings() {
        let mut root = json!({"a": {"keep": 1}});
        set(&mut root, "a.b", json!(2));
        assert_eq!(root, json!({"a": {"keep": 1, "b": 2}}));
    }

    #[test]
    fn test_set_overwrites_non_object_segment() {
        let mut root = json!({"a": "scalar"});
        set(&mut root, "a.b", json!(true));
        assert_eq!(root, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut root = json!({"a": {"b": 1}});
        set(&mut root, "a.b", json!(2));
        assert_eq!(root, json!({"a": {"b": 2}}));
    }

    proptest! {
        #[test]
        fn test_set_then_get_round_trips(
            segments in prop::collection::vec("[a-z]{1,8}", 1..4),
            text in "[a-zA-Z0-9 ]{0,16}",
        ) {
            let path = segments.join(".");
            let mut root = json!({});
            set(&mut root, &path, Value::String(text.clone()));
            prop_assert_eq!(get(&root, &path), Some(&Value::String(text)));
        }
    }
}
