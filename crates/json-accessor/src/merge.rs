//! Helpers for callers holding a concrete object node.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Sets `name` to `value`, or merges `value` into what is already there.
///
/// - missing property: set to `value`;
/// - array: `value` is appended to the existing array;
/// - anything else, JSON `null` included: replaced by `[previous, value]`.
///
/// # Example
///
/// ```
/// use json_accessor::merge::add_or_merge;
/// use serde_json::json;
///
/// let mut doc = json!({});
/// let object = doc.as_object_mut().unwrap();
/// add_or_merge(object, "tag", json!("a"));
/// add_or_merge(object, "tag", json!("b"));
/// add_or_merge(object, "tag", json!("c"));
/// assert_eq!(doc, json!({"tag": ["a", "b", "c"]}));
/// ```
pub fn add_or_merge(object: &mut Map<String, Value>, name: &str, value: Value) {
    match object.get_mut(name) {
        None => {
            object.insert(name.to_owned(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(slot) => {
            let previous = slot.take();
            *slot = Value::Array(vec![previous, value]);
        }
    }
}

/// Creates a structural copy by serializing to JSON text and parsing it back.
///
/// # Example
///
/// ```
/// use json_accessor::merge::deep_copy;
/// use serde_json::json;
///
/// let original = json!({"a": [1, {"b": null}]});
/// assert_eq!(deep_copy(&original).unwrap(), original);
/// ```
pub fn deep_copy<T>(value: &T) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let text = serde_json::to_string(value)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("Expected object"),
        }
    }

    #[test]
    fn test_add_to_missing_sets_scalar() {
        let mut obj = object(json!({}));
        add_or_merge(&mut obj, "a", json!(1));
        assert_eq!(Value::Object(obj), json!({"a": 1}));
    }

    #[test]
    fn test_add_to_scalar_promotes() {
        let mut obj = object(json!({"a": 1}));
        add_or_merge(&mut obj, "a", json!(2));
        assert_eq!(Value::Object(obj), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_add_to_object_promotes() {
        let mut obj = object(json!({"a": {"x": 1}}));
        add_or_merge(&mut obj, "a", json!({"y": 2}));
        assert_eq!(Value::Object(obj), json!({"a": [{"x": 1}, {"y": 2}]}));
    }

    #[test]
    fn test_add_to_array_appends() {
        let mut obj = object(json!({"a": [1, 2]}));
        add_or_merge(&mut obj, "a", json!(3));
        assert_eq!(Value::Object(obj), json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn test_add_to_present_null_wraps_null() {
        let mut obj = object(json!({"a": null}));
        add_or_merge(&mut obj, "a", json!(1));
        assert_eq!(Value::Object(obj), json!({"a": [null, 1]}));
    }

    #[test]
    fn test_add_keeps_key_position() {
        let mut obj = object(json!({"a": 1, "b": 2}));
        add_or_merge(&mut obj, "a", json!(3));
        let keys: Vec<_> = obj.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = json!({"arr": [1, 2, 3]});
        let mut copy = deep_copy(&original).unwrap();
        copy["arr"].as_array_mut().unwrap().push(json!(4));
        assert_eq!(original, json!({"arr": [1, 2, 3]}));
        assert_eq!(copy, json!({"arr": [1, 2, 3, 4]}));
    }

    #[test]
    fn test_deep_copy_keeps_big_numbers() {
        let original: Value = serde_json::from_str("{\"n\": 123456789012345678901234567890}").unwrap();
        assert_eq!(deep_copy(&original).unwrap(), original);
    }
}
