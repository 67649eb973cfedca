//! Canonical JSON: recursively key-sorted, no insignificant whitespace.
//!
//! Snapshot tests compare emitted resources byte for byte, so every object
//! key must appear in sorted order regardless of construction order.

use serde_json::{Map, Value};

/// Rebuild `value` with every object's keys in sorted order, recursively.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k.clone(), canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Serialize `value` canonically: sorted keys, compact separators.
pub fn to_canonical_string(value: &Value) -> String {
    canonicalize(value).to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keys_are_sorted_recursively() {
        let v = json!({
            "zulu": {"beta": 1, "alpha": 2},
            "alpha": [{"z": 1, "a": 2}],
        });
        let s = to_canonical_string(&v);
        assert_eq!(s, r#"{"alpha":[{"a":2,"z":1}],"zulu":{"alpha":2,"beta":1}}"#);
    }

    #[test]
    fn canonical_form_is_stable_across_construction_orders() {
        let a = json!({"x": 1, "y": 2});
        let mut b = Map::new();
        b.insert("y".to_string(), json!(2));
        b.insert("x".to_string(), json!(1));
        assert_eq!(to_canonical_string(&a), to_canonical_string(&Value::Object(b)));
    }

    #[test]
    fn scalars_and_arrays_pass_through() {
        assert_eq!(to_canonical_string(&json!([3, 1, 2])), "[3,1,2]");
        assert_eq!(to_canonical_string(&json!("s")), "\"s\"");
        assert_eq!(to_canonical_string(&json!(null)), "null");
    }
}
