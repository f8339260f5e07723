//! Direct device controls: fragrance selection, intensity, away and ambient
//! modes, and the nightlight.
//!
//! A [`ControlRequest`] is parsed from service-call data. Each resolved
//! device then turns it into a [`ControlCommand`], which is where the
//! device-level guards (hardware family, away mode, active bay) apply.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::device::PuraDevice;
use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::intensity::{Intensity, IntensityLevel};
use crate::slot::Slot;
use crate::target::Target;
use crate::value::{coerce_bool, coerce_int, display};

/// Position of the fragrance selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragranceOption {
    /// Stop diffusing.
    Off,
    /// Diffuse this bay continuously.
    Slot(Slot),
}

impl FragranceOption {
    /// Parse `off`, `slot_1`, `slot_2`, or a bare slot number.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] for `null`,
    /// [`ValidationError::InvalidOption`] for anything else unknown.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        if value.is_null() {
            return Err(ValidationError::MissingField("option"));
        }
        let number = match value.as_str().map(str::trim) {
            Some(text) if text.eq_ignore_ascii_case("off") => return Ok(Self::Off),
            Some(text) => text.strip_prefix("slot_").unwrap_or(text).parse().ok(),
            None => coerce_int(value),
        };
        number
            .and_then(|n| Slot::try_from(n).ok())
            .map(Self::Slot)
            .ok_or_else(|| ValidationError::InvalidOption {
                field: "option",
                value: display(value),
            })
    }
}

impl fmt::Display for FragranceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Slot(slot) => write!(f, "slot_{slot}"),
        }
    }
}

/// Nightlight state as stored on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nightlight {
    #[serde(default)]
    pub active: bool,
    /// Device scale, `1..=10`.
    #[serde(default = "Nightlight::full_brightness")]
    pub brightness: u8,
    /// Lowercase hex colour without `#`, e.g. `ffb347`.
    #[serde(default = "Nightlight::white")]
    pub color: String,
}

impl Default for Nightlight {
    fn default() -> Self {
        Self {
            active: false,
            brightness: Self::full_brightness(),
            color: Self::white(),
        }
    }
}

impl Nightlight {
    fn full_brightness() -> u8 {
        10
    }

    fn white() -> String {
        "ffffff".to_string()
    }

    /// Convert a `0..=255` brightness to the device's `1..=10` scale,
    /// rounding to the nearest step.
    #[must_use]
    pub fn scale_brightness(value: u8) -> u8 {
        let step = (u16::from(value) * 20 + 255) / 510;
        u8::try_from(step).unwrap_or(10).max(1)
    }

    #[must_use]
    pub fn hex_color([r, g, b]: [u8; 3]) -> String {
        format!("{r:02x}{g:02x}{b:02x}")
    }
}

/// What a device is told to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Control {
    /// Diffuse `slot` continuously.
    AlwaysOn { slot: Slot },
    /// Stop every bay.
    StopAll,
    /// Change the intensity of the bay under `controller`.
    SetIntensity {
        slot: Slot,
        controller: String,
        intensity: Intensity,
    },
    /// Arm or disarm away mode. `location` is only filled when arming.
    AwayMode {
        enabled: bool,
        location: Map<String, Value>,
    },
    AmbientMode { enabled: bool },
    Nightlight {
        nightlight: Nightlight,
        controller: String,
    },
}

/// One control instruction for one device, as handed to the vendor cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlCommand {
    pub device_id: DeviceId,
    pub control: Control,
}

/// A control as requested by a caller, before any device is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    SelectFragrance(FragranceOption),
    SetIntensity(Intensity),
    SetAwayMode(bool),
    SetAmbientMode(bool),
    /// `brightness` is on the `0..=255` scale; unset fields keep the
    /// current setting.
    Nightlight {
        on: bool,
        brightness: Option<u8>,
        rgb: Option<[u8; 3]>,
    },
}

impl ControlAction {
    /// Service names accepted by [`from_service_data`](Self::from_service_data).
    pub const SERVICES: [&'static str; 6] = [
        "select_fragrance",
        "set_intensity",
        "set_away_mode",
        "set_ambient_mode",
        "nightlight_on",
        "nightlight_off",
    ];

    /// Parse the fields of one service call.
    ///
    /// | Service | Fields |
    /// |---------|--------|
    /// | `select_fragrance` | `option`: `off`, `slot_1`, `slot_2` |
    /// | `set_intensity` | `intensity`: 1–10 or `subtle`/`medium`/`strong` |
    /// | `set_away_mode`, `set_ambient_mode` | `enabled` |
    /// | `nightlight_on` | optional `brightness` (0–255), `rgb_color` |
    /// | `nightlight_off` | none |
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownService`] for other service names, and the
    /// field error otherwise.
    pub fn from_service_data(service: &str, data: &Value) -> Result<Self, ValidationError> {
        let field = |name: &str| data.get(name).unwrap_or(&Value::Null);
        match service {
            "select_fragrance" => FragranceOption::from_value(field("option"))
                .map(Self::SelectFragrance),
            "set_intensity" => parse_intensity(field("intensity")).map(Self::SetIntensity),
            "set_away_mode" => parse_enabled(field("enabled")).map(Self::SetAwayMode),
            "set_ambient_mode" => parse_enabled(field("enabled")).map(Self::SetAmbientMode),
            "nightlight_on" => Ok(Self::Nightlight {
                on: true,
                brightness: parse_brightness(field("brightness"))?,
                rgb: parse_rgb(field("rgb_color"))?,
            }),
            "nightlight_off" => Ok(Self::Nightlight {
                on: false,
                brightness: None,
                rgb: None,
            }),
            other => Err(ValidationError::UnknownService(other.to_string())),
        }
    }

    /// Name of the service this action is invoked through.
    #[must_use]
    pub fn service(&self) -> &'static str {
        match self {
            Self::SelectFragrance(_) => "select_fragrance",
            Self::SetIntensity(_) => "set_intensity",
            Self::SetAwayMode(_) => "set_away_mode",
            Self::SetAmbientMode(_) => "set_ambient_mode",
            Self::Nightlight { on: true, .. } => "nightlight_on",
            Self::Nightlight { on: false, .. } => "nightlight_off",
        }
    }

    /// Derive the command for one resolved device.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnsupportedDevice`] when the hardware family
    ///   lacks the feature.
    /// - [`ValidationError::AwayModeActive`] when picking a fragrance or an
    ///   intensity while away mode is on. Turning the fragrance off is
    ///   always allowed.
    /// - [`ValidationError::NoActiveFragrance`] when changing intensity
    ///   while no bay is in use.
    /// - [`ValidationError::InvalidSlot`] or
    ///   [`ValidationError::NoFragrancesInstalled`] when the chosen bay is
    ///   empty.
    pub fn command_for(&self, device: &PuraDevice) -> Result<ControlCommand, ValidationError> {
        let kind = device.device_type;
        let unsupported = |feature| ValidationError::UnsupportedDevice {
            device: device.title(),
            feature,
        };
        let away = || ValidationError::AwayModeActive(device.title());

        let control = match *self {
            Self::SelectFragrance(_) if !kind.supports_fragrance_select() => {
                return Err(unsupported("fragrance selection"));
            }
            Self::SelectFragrance(FragranceOption::Off) => Control::StopAll,
            Self::SelectFragrance(_) if device.is_away() => return Err(away()),
            Self::SelectFragrance(FragranceOption::Slot(slot)) => {
                if !device.has_fragrance(slot) {
                    return Err(if device.installed_slots().is_empty() {
                        ValidationError::NoFragrancesInstalled(device.title())
                    } else {
                        ValidationError::empty_slot(slot, device.title())
                    });
                }
                Control::AlwaysOn { slot }
            }
            Self::SetIntensity(_) if device.is_away() => return Err(away()),
            Self::SetIntensity(intensity) => {
                let (slot, controller) = device
                    .intensity_target()
                    .ok_or_else(|| ValidationError::NoActiveFragrance(device.title()))?;
                Control::SetIntensity {
                    slot,
                    controller,
                    intensity,
                }
            }
            Self::SetAwayMode(_) if !kind.supports_away_mode() => {
                return Err(unsupported("away mode"));
            }
            Self::SetAwayMode(enabled) => Control::AwayMode {
                enabled,
                location: if enabled {
                    device.location()
                } else {
                    Map::new()
                },
            },
            Self::SetAmbientMode(_) if !kind.supports_ambient_mode() => {
                return Err(unsupported("ambient mode"));
            }
            Self::SetAmbientMode(enabled) => Control::AmbientMode { enabled },
            Self::Nightlight { .. } if !kind.has_nightlight() => {
                return Err(unsupported("a nightlight"));
            }
            Self::Nightlight {
                on,
                brightness,
                rgb,
            } => {
                let current = device.nightlight();
                let nightlight = if on {
                    Nightlight {
                        active: true,
                        brightness: brightness
                            .map_or(current.brightness, Nightlight::scale_brightness),
                        color: rgb.map_or(current.color, Nightlight::hex_color),
                    }
                } else {
                    Nightlight {
                        active: false,
                        ..current
                    }
                };
                Control::Nightlight {
                    nightlight,
                    controller: device.controller_or_default(),
                }
            }
        };

        Ok(ControlCommand {
            device_id: device.device_id.clone(),
            control,
        })
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service())
    }
}

/// A validated control service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub target: Target,
    pub action: ControlAction,
}

impl ControlRequest {
    /// Build a request from a service name and its raw call data.
    ///
    /// # Errors
    ///
    /// See [`ControlAction::from_service_data`].
    pub fn from_service_data(service: &str, data: &Value) -> Result<Self, ValidationError> {
        Ok(Self {
            action: ControlAction::from_service_data(service, data)?,
            target: Target::from_service_data(data),
        })
    }
}

fn parse_intensity(value: &Value) -> Result<Intensity, ValidationError> {
    match value.as_str().and_then(IntensityLevel::from_name) {
        Some(level) => Ok(level.representative()),
        None => Intensity::from_value(value),
    }
}

fn parse_enabled(value: &Value) -> Result<bool, ValidationError> {
    if value.is_null() {
        return Err(ValidationError::MissingField("enabled"));
    }
    coerce_bool(value).ok_or_else(|| ValidationError::InvalidOption {
        field: "enabled",
        value: display(value),
    })
}

fn parse_brightness(value: &Value) -> Result<Option<u8>, ValidationError> {
    if value.is_null() {
        return Ok(None);
    }
    coerce_int(value)
        .and_then(|n| u8::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidOption {
            field: "brightness",
            value: display(value),
        })
}

fn parse_rgb(value: &Value) -> Result<Option<[u8; 3]>, ValidationError> {
    if value.is_null() {
        return Ok(None);
    }
    let channels: Option<Vec<u8>> = value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|item| coerce_int(item).and_then(|n| u8::try_from(n).ok()))
            .collect()
    });
    match channels.as_deref() {
        Some(&[r, g, b]) if value.as_array().is_some_and(|items| items.len() == 3) => {
            Ok(Some([r, g, b]))
        }
        _ => Err(ValidationError::InvalidOption {
            field: "rgb_color",
            value: display(value),
        }),
    }
}
