//! JSON handlers for the device snapshot.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use purahub_app::ports::{PuraApi, TargetResolver};
use purahub_domain::control::{FragranceOption, Nightlight};
use purahub_domain::device::{DeviceType, PuraDevice};
use purahub_domain::error::{PuraError, TargetNotFoundError};
use purahub_domain::id::DeviceId;
use purahub_domain::intensity::Intensity;
use purahub_domain::slot::Slot;
use purahub_domain::time::{Timestamp, now};

use crate::error::ApiError;
use crate::state::AppState;

/// Readings of one fragrance bay.
#[derive(Debug, Serialize)]
pub struct BaySummary {
    pub slot: Slot,
    pub installed: bool,
    pub fragrance: Option<String>,
    pub remaining_percent: Option<f64>,
    pub runtime_seconds: Option<i64>,
    pub active: bool,
}

/// What the API reports about a diffuser.
#[derive(Debug, Serialize)]
pub struct DeviceSummary {
    pub device_id: DeviceId,
    pub name: String,
    pub title: String,
    pub device_type: DeviceType,
    pub model: String,
    /// Wi-Fi units; the others report through a paired phone.
    pub networked: bool,
    pub connected: bool,
    pub away: bool,
    pub controller: Option<String>,
    /// Fragrance selector position: `off`, `slot_1` or `slot_2`.
    pub fragrance: String,
    pub active_fragrance: String,
    pub timer_end: Option<Timestamp>,
    /// `subtle`, `medium` or `strong` while a timer runs.
    pub timer_level: Option<String>,
    pub ambient_mode: Option<bool>,
    /// Only for families with a nightlight.
    pub nightlight: Option<Nightlight>,
    pub bays: Vec<BaySummary>,
}

impl DeviceSummary {
    fn from_device(device: &PuraDevice, at: Timestamp) -> Self {
        let bays = Slot::ALL
            .into_iter()
            .take(device.device_type.bay_count())
            .filter(|slot| device.bay(*slot).is_some())
            .map(|slot| BaySummary {
                slot,
                installed: device.has_fragrance(slot),
                fragrance: device.fragrance_name(slot),
                remaining_percent: device.fragrance_remaining(slot, at),
                runtime_seconds: device.fragrance_runtime(slot, at),
                active: device.active_slot() == Some(slot),
            })
            .collect();
        Self {
            device_id: device.device_id.clone(),
            name: device.name().to_string(),
            title: device.title(),
            device_type: device.device_type,
            model: device.model_name(),
            networked: device.device_type.is_networked(),
            connected: device.connected,
            away: device.is_away(),
            controller: device.controller_kind().map(str::to_string),
            fragrance: device
                .active_slot()
                .map_or(FragranceOption::Off, FragranceOption::Slot)
                .to_string(),
            active_fragrance: device.active_fragrance(),
            timer_end: device.timer_end(),
            timer_level: device
                .timer
                .as_ref()
                .and_then(|timer| timer.intensity)
                .and_then(|value| Intensity::new(value.into()).ok())
                .map(|intensity| intensity.level().to_string()),
            ambient_mode: device.ambient_mode(),
            nightlight: device
                .device_type
                .has_nightlight()
                .then(|| device.nightlight()),
            bays,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<DeviceSummary>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<DeviceSummary>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list<A, R>(State(state): State<AppState<A, R>>) -> Result<ListResponse, ApiError>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    let at = now();
    let devices = state
        .coordinator
        .devices()
        .await
        .iter()
        .map(|d| DeviceSummary::from_device(d, at))
        .collect();
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/{id}`
pub async fn get<A, R>(
    State(state): State<AppState<A, R>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    let device_id = DeviceId::new(id);
    let device = state
        .coordinator
        .get_device(&device_id)
        .await
        .ok_or_else(|| {
            PuraError::from(TargetNotFoundError {
                target: device_id.to_string(),
            })
        })?;
    Ok(GetResponse::Ok(Json(DeviceSummary::from_device(&device, now()))))
}
