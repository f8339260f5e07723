//! Common error types used across the workspace.
//!
//! Validation failures are always raised before any device command is
//! dispatched. Failures reported by the vendor collaborator travel through
//! [`PuraError::DeviceCommand`] untouched.

use crate::slot::Slot;

/// Base error type shared by every layer.
#[derive(Debug, thiserror::Error)]
pub enum PuraError {
    /// A request field or a targeted device failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The target resolved to no device known to the integration.
    #[error(transparent)]
    TargetNotFound(#[from] TargetNotFoundError),

    /// The vendor collaborator rejected or failed a command.
    #[error("device command failed")]
    DeviceCommand(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A device record could not be decoded.
    #[error("malformed device record")]
    Decode(#[from] serde_json::Error),
}

impl PuraError {
    /// Wrap any adapter error as a [`PuraError::DeviceCommand`].
    pub fn device_command(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::DeviceCommand(Box::new(err))
    }
}

/// A field or device that does not satisfy the service contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Intensity outside `1..=10` or not an integer.
    #[error("intensity must be an integer between 1 and 10, got {0}")]
    InvalidIntensity(String),

    /// Slot outside the known set, or not installed on the targeted device.
    #[error("fragrance slot {slot} is not available{}", on_device(.device.as_deref()))]
    InvalidSlot {
        /// The slot as received.
        slot: String,
        /// Display name of the device the slot was checked against, if any.
        device: Option<String>,
    },

    /// Duration that is negative or cannot be parsed.
    #[error("duration must be a non-negative time span, got {0}")]
    InvalidDuration(String),

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// The device has no fragrance installed in any slot.
    #[error("no fragrances are installed on {0}")]
    NoFragrancesInstalled(String),

    /// A pushed change would leave a device record that no longer decodes.
    #[error("pushed record is malformed: {0}")]
    MalformedRecord(String),

    /// The device type lacks the requested feature.
    #[error("{device} does not support {feature}")]
    UnsupportedDevice {
        /// Display name of the device.
        device: String,
        /// The feature, e.g. `fragrance timers` or `ambient mode`.
        feature: &'static str,
    },

    /// Away mode blocks manual fragrance control.
    #[error(
        "away mode is active on {0}; return to your space or disable away mode to control it"
    )]
    AwayModeActive(String),

    /// Intensity was changed while no bay is diffusing.
    #[error("no fragrance is active on {0}; select a fragrance before adjusting intensity")]
    NoActiveFragrance(String),

    /// The service name is not one the hub offers.
    #[error("unknown service `pura.{0}`")]
    UnknownService(String),

    /// A control field holds a value outside its allowed set.
    #[error("invalid {field} `{value}`")]
    InvalidOption {
        field: &'static str,
        /// The value as received.
        value: String,
    },
}

impl ValidationError {
    /// Build an [`InvalidSlot`](Self::InvalidSlot) error for a slot that is
    /// empty on a specific device.
    #[must_use]
    pub fn empty_slot(slot: Slot, device: impl Into<String>) -> Self {
        Self::InvalidSlot {
            slot: slot.to_string(),
            device: Some(device.into()),
        }
    }
}

fn on_device(device: Option<&str>) -> String {
    device.map(|d| format!(" on {d}")).unwrap_or_default()
}

/// The target did not resolve to any device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no Pura devices found for target {target}")]
pub struct TargetNotFoundError {
    /// Human-readable rendering of the unresolved target.
    pub target: String,
}
