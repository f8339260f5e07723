//! Timer requests as received from callers, and the per-device commands
//! derived from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::device::PuraDevice;
use crate::duration::TimerDuration;
use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::intensity::Intensity;
use crate::slot::Slot;
use crate::target::Target;
use crate::time::Timestamp;

/// A validated "start fragrance timer" request.
///
/// Field-level validation is complete once a value of this type exists.
/// Device-level checks (installed slots, device type) happen later, once the
/// target has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRequest {
    pub target: Target,
    /// `None` asks for the slot to be chosen per device.
    pub slot: Option<Slot>,
    pub intensity: Intensity,
    pub duration: TimerDuration,
}

impl TimerRequest {
    #[must_use]
    pub fn new(
        target: Target,
        slot: Option<Slot>,
        intensity: Intensity,
        duration: TimerDuration,
    ) -> Self {
        Self {
            target,
            slot,
            intensity,
            duration,
        }
    }

    /// Build a request from raw service-call data.
    ///
    /// ```json
    /// {"device_id": "a4:cf:12:00:00:01", "slot": "2", "intensity": 6, "duration": "00:30:00"}
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation, checked in the order
    /// intensity, duration, slot.
    pub fn from_service_data(data: &Value) -> Result<Self, ValidationError> {
        let field = |name: &str| data.get(name).unwrap_or(&Value::Null);
        let intensity = Intensity::from_value(field("intensity"))?;
        let duration = TimerDuration::from_value(field("duration"))?;
        let slot = Slot::from_value(field("slot"))?;
        Ok(Self::new(Target::from_service_data(data), slot, intensity, duration))
    }

    /// Derive the command for one resolved device.
    ///
    /// An explicit slot must hold a cartridge on this device; an omitted
    /// slot is picked with [`PuraDevice::auto_select_slot`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedDevice`] for car diffusers,
    /// [`ValidationError::NoFragrancesInstalled`] when every bay is empty,
    /// and [`ValidationError::InvalidSlot`] when the requested slot is empty.
    pub fn command_for(
        &self,
        device: &PuraDevice,
        now: Timestamp,
    ) -> Result<TimerCommand, ValidationError> {
        if !device.device_type.supports_timer() {
            return Err(ValidationError::UnsupportedDevice {
                device: device.title(),
                feature: "fragrance timers",
            });
        }
        let slot = match self.slot {
            Some(slot) if device.has_fragrance(slot) => slot,
            Some(_) if device.installed_slots().is_empty() => {
                return Err(ValidationError::NoFragrancesInstalled(device.title()));
            }
            Some(slot) => return Err(ValidationError::empty_slot(slot, device.title())),
            None => device
                .auto_select_slot(now)
                .ok_or_else(|| ValidationError::NoFragrancesInstalled(device.title()))?,
        };
        Ok(TimerCommand {
            device_id: device.device_id.clone(),
            slot,
            intensity: self.intensity,
            duration: self.duration,
        })
    }
}

/// One timer instruction for one device, as handed to the vendor cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCommand {
    pub device_id: DeviceId,
    pub slot: Slot,
    pub intensity: Intensity,
    pub duration: TimerDuration,
}
