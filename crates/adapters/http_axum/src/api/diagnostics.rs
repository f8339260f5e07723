//! Redacted dump of the device snapshot.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use purahub_app::ports::{PuraApi, TargetResolver};
use purahub_domain::diagnostics::{TO_REDACT, redact};
use purahub_domain::error::PuraError;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/diagnostics`
pub async fn get<A, R>(State(state): State<AppState<A, R>>) -> Result<Json<Value>, ApiError>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    let devices = serde_json::to_value(state.coordinator.devices().await).map_err(PuraError::from)?;
    Ok(Json(redact(&json!({ "devices": devices }), &TO_REDACT)))
}
