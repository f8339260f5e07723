//! Service-call handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use serde_json::Value;

use purahub_app::ports::{PuraApi, TargetResolver};

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned once every targeted device accepted its command.
#[derive(Debug, Serialize)]
pub struct ServiceCallResponse {
    pub dispatched: usize,
}

/// `POST /api/services/pura/start_timer`
///
/// Takes the raw service-call data: `device_id` and/or `entity_id`
/// (directly or under `target`), `slot`, `intensity` and `duration`.
pub async fn start_timer<A, R>(
    State(state): State<AppState<A, R>>,
    Json(data): Json<Value>,
) -> Result<Json<ServiceCallResponse>, ApiError>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    let dispatched = state.timer_service.start_timer_from_data(&data).await?;
    Ok(Json(ServiceCallResponse { dispatched }))
}

/// `POST /api/services/pura/{service}`
///
/// Direct controls: `select_fragrance`, `set_intensity`, `set_away_mode`,
/// `set_ambient_mode`, `nightlight_on` and `nightlight_off`. Targets are
/// given as for `start_timer`.
pub async fn call<A, R>(
    State(state): State<AppState<A, R>>,
    Path(service): Path<String>,
    Json(data): Json<Value>,
) -> Result<Json<ServiceCallResponse>, ApiError>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    let dispatched = state.control_service.call_from_data(&service, &data).await?;
    Ok(Json(ServiceCallResponse { dispatched }))
}
