//! Device — a Pura diffuser as reported by the vendor cloud.
//!
//! Records are deserialized from the cloud's camelCase JSON. Keys this crate
//! does not model are kept in `extra` so that merges and diagnostics see
//! the full record.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::control::Nightlight;
use crate::fragrance::Bay;
use crate::id::DeviceId;
use crate::merge::deep_merge;
use crate::message::RecordChange;
use crate::slot::Slot;
use crate::time::{Timestamp, from_unix};

/// Controller assumed for a record that reports none.
pub const DEFAULT_CONTROLLER: &str = "always_on";

/// Hardware family of a diffuser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Wall,
    Car,
    Plus,
    Mini,
}

impl DeviceType {
    /// Car diffusers have no timer support.
    #[must_use]
    pub fn supports_timer(self) -> bool {
        !matches!(self, Self::Car)
    }

    /// Wall and Plus diffusers sit on Wi-Fi; the others pair over Bluetooth.
    #[must_use]
    pub fn is_networked(self) -> bool {
        matches!(self, Self::Wall | Self::Plus)
    }

    /// Number of fragrance bays the hardware has.
    #[must_use]
    pub fn bay_count(self) -> usize {
        match self {
            Self::Wall | Self::Plus => 2,
            Self::Car | Self::Mini => 1,
        }
    }

    /// Car diffusers have no fragrance selector.
    #[must_use]
    pub fn supports_fragrance_select(self) -> bool {
        !matches!(self, Self::Car)
    }

    #[must_use]
    pub fn supports_away_mode(self) -> bool {
        !matches!(self, Self::Car)
    }

    #[must_use]
    pub fn supports_ambient_mode(self) -> bool {
        matches!(self, Self::Wall)
    }

    #[must_use]
    pub fn has_nightlight(self) -> bool {
        matches!(self, Self::Wall | Self::Mini)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::Car => "Car",
            Self::Plus => "Plus",
            Self::Mini => "Mini",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wall => f.write_str("wall"),
            Self::Car => f.write_str("car"),
            Self::Plus => f.write_str("plus"),
            Self::Mini => f.write_str("mini"),
        }
    }
}

/// User-assigned device name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayName {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Timer currently running on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerRecord {
    #[serde(default)]
    pub bay: Option<u8>,
    #[serde(default)]
    pub intensity: Option<u8>,
    /// Unix seconds at which the timer stops.
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A Pura diffuser record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuraDevice {
    pub device_id: DeviceId,
    pub device_type: DeviceType,
    pub display_name: DisplayName,
    /// Numeric hardware model (1 wall, 2 car, 3 plus, 4 mini) or a label.
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub hw_version: Option<String>,
    #[serde(default)]
    pub fw_version: Option<String>,
    #[serde(default)]
    pub bay1: Option<Bay>,
    #[serde(default)]
    pub bay2: Option<Bay>,
    #[serde(default)]
    pub connected: bool,
    /// Unix seconds of the last cloud check-in. Bluetooth devices report
    /// nothing here while they stream runtime live.
    #[serde(default)]
    pub last_connected_at: Option<i64>,
    /// What drives the diffuser: `timer`, `away`, `always_on`, a schedule
    /// number, …
    #[serde(default, deserialize_with = "lenient_string")]
    pub controller: Option<String>,
    #[serde(default)]
    pub timer: Option<TimerRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PuraDevice {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.display_name.name
    }

    /// Name shown for the device in the host platform.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} Diffuser", self.name())
    }

    #[must_use]
    pub fn bay(&self, slot: Slot) -> Option<&Bay> {
        match slot {
            Slot::One => self.bay1.as_ref(),
            Slot::Two => self.bay2.as_ref(),
        }
    }

    /// Whether a cartridge is installed in `slot`.
    #[must_use]
    pub fn has_fragrance(&self, slot: Slot) -> bool {
        self.bay(slot).is_some_and(Bay::is_installed)
    }

    /// Slots with a cartridge installed, ascending.
    #[must_use]
    pub fn installed_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| self.has_fragrance(*slot))
            .collect()
    }

    /// Seconds of accumulated runtime for the cartridge in `slot`.
    #[must_use]
    pub fn fragrance_runtime(&self, slot: Slot, now: Timestamp) -> Option<i64> {
        self.bay(slot)
            .map(|bay| bay.runtime(self.last_connected_at, now))
    }

    /// Estimated percentage of scent left in `slot`, when it can be known.
    #[must_use]
    pub fn fragrance_remaining(&self, slot: Slot, now: Timestamp) -> Option<f64> {
        self.bay(slot)
            .and_then(|bay| bay.remaining_percent(self.last_connected_at, now))
    }

    #[must_use]
    pub fn fragrance_name(&self, slot: Slot) -> Option<String> {
        self.bay(slot).filter(|b| b.is_installed()).map(Bay::display_name)
    }

    /// First bay that is currently diffusing.
    #[must_use]
    pub fn active_slot(&self) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.bay(*slot).is_some_and(Bay::is_active))
    }

    /// Name of the fragrance being diffused, or `none`.
    #[must_use]
    pub fn active_fragrance(&self) -> String {
        self.active_slot()
            .and_then(|slot| self.fragrance_name(slot))
            .unwrap_or_else(|| "none".to_string())
    }

    /// Controller kind; numeric schedule ids collapse to `schedule`.
    #[must_use]
    pub fn controller_kind(&self) -> Option<&str> {
        let controller = self.controller.as_deref()?;
        if !controller.is_empty() && controller.chars().all(|c| c.is_ascii_digit()) {
            Some("schedule")
        } else {
            Some(controller)
        }
    }

    /// Whether away mode currently blocks manual control.
    #[must_use]
    pub fn is_away(&self) -> bool {
        self.controller.as_deref() == Some("away")
    }

    /// When the running timer ends.
    #[must_use]
    pub fn timer_end(&self) -> Option<Timestamp> {
        self.timer
            .as_ref()
            .and_then(|t| t.end)
            .filter(|end| *end != 0)
            .and_then(from_unix)
    }

    /// Human model name such as `Pura 4` or `Pura Mini`.
    ///
    /// Wall units report their hardware generation; generations 1 and 2 are
    /// sold as the Pura 3.
    #[must_use]
    pub fn model_name(&self) -> String {
        let label = match &self.model {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(1) => DeviceType::Wall.label().to_string(),
                Some(2) => DeviceType::Car.label().to_string(),
                Some(3) => DeviceType::Plus.label().to_string(),
                Some(4) => DeviceType::Mini.label().to_string(),
                _ => n.to_string(),
            },
            Some(Value::String(s)) if s == "car" => DeviceType::Car.label().to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => self.device_type.label().to_string(),
        };

        if label != DeviceType::Wall.label() {
            return format!("Pura {label}");
        }
        let version = self.hw_version.as_deref().unwrap_or("3");
        let generation = version.split('.').next().unwrap_or(version);
        match generation {
            "1" | "2" => "Pura 3".to_string(),
            other => format!("Pura {other}"),
        }
    }

    /// Pick the slot a timer should use when the caller did not choose one.
    ///
    /// A single installed cartridge wins outright. With two, the one with
    /// more scent left wins (unknown counts as empty), then the one with
    /// less runtime, then slot 1. Returns `None` when nothing is installed.
    #[must_use]
    pub fn auto_select_slot(&self, now: Timestamp) -> Option<Slot> {
        match self.installed_slots().as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                let left = |slot| self.fragrance_remaining(slot, now).unwrap_or(0.0);
                let (one, two) = (left(Slot::One), left(Slot::Two));
                if one > two {
                    Some(Slot::One)
                } else if two > one {
                    Some(Slot::Two)
                } else {
                    let runtime = |slot| self.fragrance_runtime(slot, now).unwrap_or(0);
                    if runtime(Slot::One) <= runtime(Slot::Two) {
                        Some(Slot::One)
                    } else {
                        Some(Slot::Two)
                    }
                }
            }
        }
    }
}

impl PuraDevice {
    /// The raw controller, or [`DEFAULT_CONTROLLER`].
    #[must_use]
    pub fn controller_or_default(&self) -> String {
        self.controller
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTROLLER.to_string())
    }

    /// The schedule in charge, when the controller is a schedule number.
    fn active_schedule(&self) -> Option<&Map<String, Value>> {
        let controller = self.controller.as_deref()?;
        if self.controller_kind() != Some("schedule") {
            return None;
        }
        self.extra
            .get("schedules")?
            .as_array()?
            .iter()
            .filter_map(Value::as_object)
            .find(|schedule| match schedule.get("number") {
                Some(Value::Number(n)) => n.to_string() == controller,
                Some(Value::String(s)) => s == controller,
                _ => false,
            })
    }

    /// Bay and controller an intensity change applies to.
    ///
    /// A running timer's bay wins, then the bay of the schedule in charge,
    /// then the bay that is diffusing, then the bay the device reports in
    /// `deviceActiveState`.
    #[must_use]
    pub fn intensity_target(&self) -> Option<(Slot, String)> {
        let controller = self.controller_or_default();
        let bay = if controller == "timer" {
            self.timer.as_ref().and_then(|t| t.bay).map(i64::from)
        } else {
            self.active_schedule()
                .and_then(|schedule| schedule.get("bay"))
                .and_then(Value::as_i64)
        };
        let reported = || {
            self.extra
                .get("deviceActiveState")
                .and_then(|state| state.get("activeBay"))
                .and_then(Value::as_i64)
                .and_then(|n| Slot::try_from(n).ok())
        };
        let slot = bay
            .and_then(|n| Slot::try_from(n).ok())
            .or_else(|| self.active_slot())
            .or_else(reported)?;
        Some((slot, controller))
    }

    /// Nightlight settings in force: the schedule's, else the device defaults.
    #[must_use]
    pub fn nightlight(&self) -> Nightlight {
        let present = |value: &&Value| value.as_object().is_some_and(|m| !m.is_empty());
        self.active_schedule()
            .and_then(|schedule| schedule.get("nightlight"))
            .filter(present)
            .or_else(|| {
                self.extra
                    .get("deviceDefaults")
                    .and_then(|defaults| defaults.get("nightlight"))
                    .filter(present)
            })
            .and_then(|value| Nightlight::deserialize(value).ok())
            .unwrap_or_default()
    }

    /// Whether ambient mode is on, when the record says.
    #[must_use]
    pub fn ambient_mode(&self) -> Option<bool> {
        self.toggle("ambientMode")
    }

    /// Whether away mode is armed, when the record says.
    #[must_use]
    pub fn away_mode(&self) -> Option<bool> {
        self.toggle("awayMode")
    }

    /// Switch-like settings come as a bare bool or as `{"enabled": bool}`.
    fn toggle(&self, key: &str) -> Option<bool> {
        match self.extra.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Object(map) => map.get("enabled").and_then(Value::as_bool),
            _ => None,
        }
    }

    /// Geofence (`radius`, `latitude`, `longitude`) of the device.
    #[must_use]
    pub fn location(&self) -> Map<String, Value> {
        self.extra
            .get("deviceLocation")
            .and_then(Value::as_object)
            .map(|location| {
                location
                    .iter()
                    .filter(|(key, _)| matches!(key.as_str(), "radius" | "latitude" | "longitude"))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PuraDevice {
    /// Apply a pushed change to this record.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the merged record or the new
    /// timer no longer decodes; the record is left untouched in that case.
    pub fn apply(&mut self, change: RecordChange<'_>) -> Result<(), serde_json::Error> {
        match change {
            RecordChange::Device(patch) => {
                let mut record = match serde_json::to_value(&*self)? {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                deep_merge(&mut record, patch);
                *self = serde_json::from_value(Value::Object(record))?;
            }
            RecordChange::TimerSet(timer) => {
                self.timer = serde_json::from_value(timer.clone())?;
            }
            RecordChange::TimerRemoved => self.timer = None,
        }
        Ok(())
    }
}

/// Accept a string, a number, or null for fields the cloud types loosely.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
