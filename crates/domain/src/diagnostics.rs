//! Redaction of sensitive keys for diagnostics dumps.

use serde_json::Value;

/// Keys whose values never leave the process unredacted.
pub const TO_REDACT: [&str; 8] = [
    "latitude",
    "longitude",
    "device_id",
    "deviceId",
    "pk",
    "serialNumber",
    "sk",
    "uid",
];

pub const REDACTED: &str = "**REDACTED**";

/// Return a copy of `data` with the values of `keys` replaced at any depth.
///
/// `null` and empty-string values are left as they are so that absence
/// stays visible.
#[must_use]
pub fn redact(data: &Value, keys: &[&str]) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if keys.contains(&key.as_str()) && !is_blank(value) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(value, keys)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact(v, keys)).collect()),
        other => other.clone(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_redact_nested_keys() {
        let data = json!({
            "devices": [{
                "deviceId": "a4:cf",
                "deviceLocation": {"latitude": 1.5, "longitude": 2.5, "radius": 100},
                "displayName": {"name": "Office"}
            }]
        });
        let redacted = redact(&data, &TO_REDACT);
        assert_eq!(
            redacted,
            json!({
                "devices": [{
                    "deviceId": REDACTED,
                    "deviceLocation": {"latitude": REDACTED, "longitude": REDACTED, "radius": 100},
                    "displayName": {"name": "Office"}
                }]
            })
        );
    }

    #[test]
    fn should_leave_null_values_alone() {
        let redacted = redact(&json!({"uid": null}), &TO_REDACT);
        assert_eq!(redacted, json!({"uid": null}));
    }

    #[test]
    fn should_leave_empty_strings_alone() {
        let redacted = redact(&json!({"serialNumber": "", "pk": "x"}), &TO_REDACT);
        assert_eq!(redacted, json!({"serialNumber": "", "pk": REDACTED}));
    }
}
