//! Change notifications pushed by the Pura cloud.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::DeviceId;

static NO_TIMER: Value = Value::Null;

/// A raw push message, e.g.
///
/// ```json
/// {
///   "eventType": "MODIFY",
///   "recordType": "DEVICE",
///   "deviceId": "a4:cf",
///   "deviceRecord": {"connected": false}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    #[serde(default)]
    pub device_record: Option<Map<String, Value>>,
    #[serde(default)]
    pub timer_record: Option<Value>,
}

/// What a push message asks to change on a device record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordChange<'a> {
    /// Partial device record to deep-merge.
    Device(&'a Map<String, Value>),
    /// New timer record; `null` when the message carried none.
    TimerSet(&'a Value),
    TimerRemoved,
}

impl PushMessage {
    /// Classify the message. Returns `None` for combinations the hub does
    /// not understand.
    #[must_use]
    pub fn change(&self) -> Option<RecordChange<'_>> {
        match (self.event_type.as_deref()?, self.record_type.as_deref()?) {
            ("MODIFY", "DEVICE") => self.device_record.as_ref().map(RecordChange::Device),
            ("REMOVE", "TIMER") => Some(RecordChange::TimerRemoved),
            ("INSERT" | "MODIFY", "TIMER") => Some(RecordChange::TimerSet(
                self.timer_record.as_ref().unwrap_or(&NO_TIMER),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: Value) -> PushMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn should_classify_device_modification() {
        let msg = message(json!({
            "eventType": "MODIFY",
            "recordType": "DEVICE",
            "deviceId": "a4:cf",
            "deviceRecord": {"connected": false},
        }));
        assert!(matches!(
            msg.change(),
            Some(RecordChange::Device(record)) if record.contains_key("connected")
        ));
        assert_eq!(msg.device_id, Some(DeviceId::new("a4:cf")));
    }

    #[test]
    fn should_classify_timer_events() {
        let inserted = message(json!({
            "eventType": "INSERT",
            "recordType": "TIMER",
            "deviceId": "a4:cf",
            "timerRecord": {"bay": 1, "end": 1_700_000_000},
        }));
        assert!(matches!(inserted.change(), Some(RecordChange::TimerSet(v)) if v["bay"] == 1));

        let removed = message(json!({
            "eventType": "REMOVE",
            "recordType": "TIMER",
            "deviceId": "a4:cf",
        }));
        assert_eq!(removed.change(), Some(RecordChange::TimerRemoved));
    }

    #[test]
    fn should_not_classify_unknown_events() {
        for event in ["INSERT", "MODIFY"] {
            let msg = message(json!({
                "eventType": event,
                "recordType": "DEVICE",
                "deviceId": "a4:cf",
            }));
            assert_eq!(msg.change(), None);
        }
    }
}
