//! Deep merge of partial device records pushed by the cloud.

use serde_json::{Map, Value};

/// Merge `patch` into `target` recursively.
///
/// Nested objects merge key by key; any other differing value overwrites.
/// When a `code` key turns falsy inside an object that carries a
/// `fragrance`, the cartridge was removed and `fragrance` is dropped too.
pub fn deep_merge(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (Some(existing), _) if existing == value => {}
            (Some(_), _) => {
                target.insert(key.clone(), value.clone());
                if key == "code" && is_falsy(value) {
                    target.remove("fragrance");
                }
            }
            (None, _) => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
