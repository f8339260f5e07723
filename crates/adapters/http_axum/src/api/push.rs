//! Pushed change messages from the Pura cloud.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use purahub_app::ports::{PuraApi, TargetResolver};
use purahub_domain::message::PushMessage;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub applied: bool,
}

/// `POST /api/push`
///
/// Messages that are not understood, or that name an unknown device, are
/// acknowledged with `applied: false`.
pub async fn receive<A, R>(
    State(state): State<AppState<A, R>>,
    Json(message): Json<PushMessage>,
) -> Result<Json<PushResponse>, ApiError>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    let applied = state.coordinator.handle_message(&message).await?;
    Ok(Json(PushResponse { applied }))
}
