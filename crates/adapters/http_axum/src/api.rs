//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod diagnostics;
#[allow(clippy::missing_errors_doc)]
pub mod push;
#[allow(clippy::missing_errors_doc)]
pub mod services;

use axum::Router;
use axum::routing::{get, post};

use purahub_app::ports::{PuraApi, TargetResolver};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<A, R>() -> Router<AppState<A, R>>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    Router::new()
        // Devices
        .route("/devices", get(devices::list::<A, R>))
        .route("/devices/{id}", get(devices::get::<A, R>))
        // Diagnostics
        .route("/diagnostics", get(diagnostics::get::<A, R>))
        // Pushed changes
        .route("/push", post(push::receive::<A, R>))
        // Service calls
        .route(
            "/services/pura/start_timer",
            post(services::start_timer::<A, R>),
        )
        .route("/services/pura/{service}", post(services::call::<A, R>))
}
