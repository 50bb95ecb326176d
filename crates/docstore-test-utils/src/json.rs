// JSON helpers shared by backend test suites.

use serde_json::{json, Value};

/// Deep merge two JSON values; overlay objects merge key-wise, anything
/// else replaces the base.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (key, value) in b {
                let existing = merged.get(key).cloned().unwrap_or(Value::Null);
                merged.insert(key.clone(), deep_merge(&existing, value));
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Sort entities by the string value of one field; entities missing the
/// field sort first.
pub fn sort_entities(entities: &mut [Value], field: &str) {
    entities.sort_by(|a, b| {
        let a_val = a.get(field).and_then(Value::as_str).unwrap_or("");
        let b_val = b.get(field).and_then(Value::as_str).unwrap_or("");
        a_val.cmp(b_val)
    });
}

/// Deterministic seed entities for adapter tests.
pub fn sample_entities(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "name": format!("person-{i:03}"),
                "age": 20 + (i as i64 % 40),
                "active": i % 2 == 0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge_nested_objects() {
        let base = json!({ "a": 1, "b": { "c": 2 } });
        let overlay = json!({ "b": { "d": 3 }, "e": 4 });
        let merged = deep_merge(&base, &overlay);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"]["c"], 2);
        assert_eq!(merged["b"]["d"], 3);
        assert_eq!(merged["e"], 4);
    }

    #[test]
    fn test_deep_merge_scalar_replaces() {
        assert_eq!(deep_merge(&json!({ "a": 1 }), &json!(5)), json!(5));
    }

    #[test]
    fn test_sort_entities() {
        let mut entities = vec![
            json!({ "name": "c" }),
            json!({ "name": "a" }),
            json!({ "name": "b" }),
        ];
        sort_entities(&mut entities, "name");
        assert_eq!(entities[0]["name"], "a");
        assert_eq!(entities[2]["name"], "c");
    }

    #[test]
    fn test_sample_entities_are_deterministic() {
        let a = sample_entities(3);
        let b = sample_entities(3);
        assert_eq!(a, b);
        assert_eq!(a[0]["name"], "person-000");
        assert_eq!(a[1]["active"], false);
    }
}
