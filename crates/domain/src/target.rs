//! Target — the device and entity references a service call is aimed at.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::id::{DeviceId, EntityId};

/// Device and/or entity references, each given as a single id or a list.
///
/// Resolution to physical devices belongs to the host platform; this type
/// only carries what the caller asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, rename = "device_id", deserialize_with = "one_or_many")]
    pub device_ids: Vec<DeviceId>,
    #[serde(default, rename = "entity_id", deserialize_with = "one_or_many")]
    pub entity_ids: Vec<EntityId>,
}

impl Target {
    /// Target a single device.
    #[must_use]
    pub fn device(id: impl Into<DeviceId>) -> Self {
        Self {
            device_ids: vec![id.into()],
            entity_ids: Vec::new(),
        }
    }

    /// Target a single entity.
    #[must_use]
    pub fn entity(id: impl Into<EntityId>) -> Self {
        Self {
            device_ids: Vec::new(),
            entity_ids: vec![id.into()],
        }
    }

    /// Target several devices.
    #[must_use]
    pub fn devices<I, D>(ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DeviceId>,
    {
        Self {
            device_ids: ids.into_iter().map(Into::into).collect(),
            entity_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.device_ids.is_empty() && self.entity_ids.is_empty()
    }

    /// Extract the target from service-call data.
    ///
    /// References may sit under a nested `target` object, at the top level,
    /// or both; all of them are collected. Malformed references are ignored,
    /// which leaves the target empty and lets resolution report it.
    #[must_use]
    pub fn from_service_data(data: &Value) -> Self {
        let mut target = Self::default();
        let sources = [data.get("target"), Some(data)];
        for source in sources.into_iter().flatten() {
            if let Ok(part) = Self::deserialize(source) {
                target.device_ids.extend(part.device_ids);
                target.entity_ids.extend(part.entity_ids);
            }
        }
        target
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let refs: Vec<&str> = self
            .device_ids
            .iter()
            .map(DeviceId::as_str)
            .chain(self.entity_ids.iter().map(EntityId::as_str))
            .collect();
        write!(f, "[{}]", refs.join(", "))
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(id) => vec![T::from(id)],
        OneOrMany::Many(ids) => ids.into_iter().map(T::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_accept_single_ids_and_lists() {
        let target: Target = serde_json::from_value(json!({
            "device_id": "dev-a",
            "entity_id": ["select.a_fragrance", "sensor.b_timer"],
        }))
        .unwrap();
        assert_eq!(target.device_ids, vec![DeviceId::new("dev-a")]);
        assert_eq!(target.entity_ids.len(), 2);
    }

    #[test]
    fn should_collect_nested_and_top_level_references() {
        let data = json!({
            "target": {"device_id": ["dev-a"]},
            "device_id": "dev-b",
            "intensity": 4,
        });
        let target = Target::from_service_data(&data);
        assert_eq!(
            target.device_ids,
            vec![DeviceId::new("dev-a"), DeviceId::new("dev-b")]
        );
    }

    #[test]
    fn should_be_empty_when_no_references_given() {
        let target = Target::from_service_data(&json!({"intensity": 4}));
        assert!(target.is_empty());
    }

    #[test]
    fn should_ignore_malformed_references() {
        let target = Target::from_service_data(&json!({"device_id": 42}));
        assert!(target.is_empty());
    }

    #[test]
    fn should_display_all_references() {
        let mut target = Target::device("dev-a");
        target.entity_ids.push(EntityId::new("select.b_fragrance"));
        assert_eq!(target.to_string(), "[dev-a, select.b_fragrance]");
    }
}
