//! # purahub-adapter-virtual
//!
//! Simulated Pura cloud for testing and demonstration purposes.
//!
//! ## Provided devices
//!
//! | Device | Type | Bays |
//! |--------|------|------|
//! | Living Room | `wall` (Pura 4) | French Lavender, Lemon Verbena |
//! | Office | `mini` | Mahogany Teakwood |
//! | Car | `car` | Ocean Air |
//!
//! A different account can be loaded from JSON with
//! [`VirtualPuraApi::from_json`], either as a flat list of device records or
//! grouped by device type the way the cloud returns them.
//!
//! Timer and control commands are applied to the stored records the way the
//! cloud would report them on the next poll, and are kept for inspection
//! ([`VirtualPuraApi::sent_commands`], [`VirtualPuraApi::sent_controls`]).
//!
//! ## Dependency rule
//!
//! Depends on `purahub-app` (port traits) and `purahub-domain` only.

mod devices;
pub mod error;

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value, json};

use purahub_app::ports::PuraApi;
use purahub_domain::control::{Control, ControlCommand};
use purahub_domain::device::{DEFAULT_CONTROLLER, PuraDevice, TimerRecord};
use purahub_domain::error::PuraError;
use purahub_domain::id::DeviceId;
use purahub_domain::message::RecordChange;
use purahub_domain::slot::Slot;
use purahub_domain::time::now;
use purahub_domain::timer::TimerCommand;

pub use error::VirtualError;

/// In-memory stand-in for the Pura cloud account.
pub struct VirtualPuraApi {
    devices: Mutex<Vec<PuraDevice>>,
    sent: Mutex<Vec<TimerCommand>>,
    controls: Mutex<Vec<ControlCommand>>,
    armed_failures: Mutex<HashSet<DeviceId>>,
}

impl Default for VirtualPuraApi {
    fn default() -> Self {
        // The built-in records are static and always decode.
        let devices = parse_records(devices::default_records()).unwrap_or_default();
        Self::with_devices(devices)
    }
}

impl VirtualPuraApi {
    #[must_use]
    pub fn with_devices(devices: Vec<PuraDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            sent: Mutex::new(Vec::new()),
            controls: Mutex::new(Vec::new()),
            armed_failures: Mutex::new(HashSet::new()),
        }
    }

    /// Load an account from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::Parse`] if the text is not a list of device
    /// records or an object mapping device types to such lists.
    pub fn from_json(text: &str) -> Result<Self, VirtualError> {
        let value: Value = serde_json::from_str(text).map_err(VirtualError::Parse)?;
        Ok(Self::with_devices(parse_records(value)?))
    }

    /// Make the next timer or control command for `device_id` fail.
    pub fn fail_next_command(&self, device_id: impl Into<DeviceId>) {
        lock(&self.armed_failures).insert(device_id.into());
    }

    /// Every timer command accepted so far, oldest first.
    #[must_use]
    pub fn sent_commands(&self) -> Vec<TimerCommand> {
        lock(&self.sent).clone()
    }

    /// Every control command accepted so far, oldest first.
    #[must_use]
    pub fn sent_controls(&self) -> Vec<ControlCommand> {
        lock(&self.controls).clone()
    }

    fn check_armed(&self, device_id: &DeviceId) -> Result<(), VirtualError> {
        if lock(&self.armed_failures).remove(device_id) {
            return Err(VirtualError::Rejected(device_id.clone()));
        }
        Ok(())
    }

    fn apply_timer(&self, command: &TimerCommand) -> Result<(), VirtualError> {
        self.check_armed(&command.device_id)?;

        let mut devices = lock(&self.devices);
        let device = devices
            .iter_mut()
            .find(|d| d.device_id == command.device_id)
            .ok_or_else(|| VirtualError::UnknownDevice(command.device_id.clone()))?;

        let started = now().timestamp();
        let length = i64::try_from(command.duration.as_secs()).unwrap_or(i64::MAX);
        device.timer = Some(TimerRecord {
            bay: Some(command.slot.number()),
            intensity: Some(command.intensity.value()),
            end: Some(started.saturating_add(length)),
            extra: serde_json::Map::new(),
        });
        device.controller = Some("timer".to_string());
        for slot in Slot::ALL {
            let bay = match slot {
                Slot::One => device.bay1.as_mut(),
                Slot::Two => device.bay2.as_mut(),
            };
            if let Some(bay) = bay {
                bay.active_at = (slot == command.slot).then_some(started);
            }
        }
        drop(devices);

        lock(&self.sent).push(command.clone());
        Ok(())
    }

    fn apply_control(&self, command: &ControlCommand) -> Result<(), VirtualError> {
        self.check_armed(&command.device_id)?;

        let mut devices = lock(&self.devices);
        let device = devices
            .iter_mut()
            .find(|d| d.device_id == command.device_id)
            .ok_or_else(|| VirtualError::UnknownDevice(command.device_id.clone()))?;
        let patch = control_patch(device, &command.control, now().timestamp());
        device
            .apply(RecordChange::Device(&patch))
            .map_err(VirtualError::Parse)?;
        drop(devices);

        lock(&self.controls).push(command.clone());
        Ok(())
    }
}

/// Record fields the cloud rewrites when it carries out `control`.
fn control_patch(device: &PuraDevice, control: &Control, at: i64) -> Map<String, Value> {
    let mut patch = Map::new();
    match control {
        Control::AlwaysOn { slot } => diffuse(&mut patch, device, Some(*slot), at),
        Control::StopAll => diffuse(&mut patch, device, None, at),
        Control::SetIntensity {
            controller,
            intensity,
            ..
        } if controller == "timer" => {
            patch.insert("timer".into(), json!({"intensity": intensity.value()}));
        }
        Control::SetIntensity {
            slot, intensity, ..
        } => {
            let mut defaults = Map::new();
            defaults.insert(format!("bay{slot}Intensity"), json!(intensity.value()));
            patch.insert("deviceDefaults".into(), Value::Object(defaults));
            patch.insert(
                "deviceActiveState".into(),
                json!({"activeBayIntensity": intensity.value()}),
            );
        }
        Control::AwayMode { enabled, .. } => {
            let controller = if *enabled { "away" } else { DEFAULT_CONTROLLER };
            patch.insert("awayMode".into(), json!({"enabled": enabled}));
            patch.insert("controller".into(), json!(controller));
        }
        Control::AmbientMode { enabled } => {
            patch.insert("ambientMode".into(), json!(enabled));
        }
        Control::Nightlight { nightlight, .. } => {
            patch.insert("deviceDefaults".into(), json!({"nightlight": nightlight}));
        }
    }
    patch
}

/// Make `active` the only diffusing bay, or stop every bay.
fn diffuse(patch: &mut Map<String, Value>, device: &PuraDevice, active: Option<Slot>, at: i64) {
    for slot in Slot::ALL.into_iter().filter(|slot| device.bay(*slot).is_some()) {
        let active_at = (Some(slot) == active).then_some(at);
        patch.insert(format!("bay{slot}"), json!({"activeAt": active_at}));
    }
    let active_bay = active.map_or(0, Slot::number);
    patch.insert("deviceActiveState".into(), json!({"activeBay": active_bay}));
    patch.insert("controller".into(), json!(DEFAULT_CONTROLLER));
    patch.insert("timer".into(), Value::Null);
}

impl PuraApi for VirtualPuraApi {
    fn get_devices(&self) -> impl Future<Output = Result<Vec<PuraDevice>, PuraError>> + Send {
        let devices = lock(&self.devices).clone();
        async move { Ok(devices) }
    }

    fn set_timer(
        &self,
        command: TimerCommand,
    ) -> impl Future<Output = Result<(), PuraError>> + Send {
        let result = self.apply_timer(&command).map_err(|err| {
            tracing::warn!(device_id = %command.device_id, %err, "virtual timer rejected");
            PuraError::from(err)
        });
        async move { result }
    }

    fn send_control(
        &self,
        command: ControlCommand,
    ) -> impl Future<Output = Result<(), PuraError>> + Send {
        let result = self.apply_control(&command).map_err(|err| {
            tracing::warn!(device_id = %command.device_id, %err, "virtual control rejected");
            PuraError::from(err)
        });
        async move { result }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn parse_records(value: Value) -> Result<Vec<PuraDevice>, VirtualError> {
    let records: Vec<Value> = match value {
        Value::Object(by_type) => by_type
            .into_iter()
            .flat_map(|(_, group)| match group {
                Value::Array(items) => items,
                other => vec![other],
            })
            .collect(),
        other => serde_json::from_value(other).map_err(VirtualError::Parse)?,
    };
    records
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(VirtualError::Parse))
        .collect()
}
