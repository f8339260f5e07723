//! Shared application state for axum handlers.

use std::sync::Arc;

use purahub_app::ports::{PuraApi, TargetResolver};
use purahub_app::services::control_service::ControlService;
use purahub_app::services::coordinator::DeviceCoordinator;
use purahub_app::services::timer_service::TimerService;

/// Application state shared across all axum handlers.
///
/// Generic over the Pura cloud client and the target resolver. `Clone` only
/// bumps the `Arc`s, so neither `A` nor `R` has to be `Clone`.
pub struct AppState<A, R> {
    /// Owner of the device snapshot.
    pub coordinator: Arc<DeviceCoordinator<A>>,
    /// The `start_timer` use-case.
    pub timer_service: Arc<TimerService<A, Arc<R>>>,
    /// Fragrance, intensity, mode and nightlight controls.
    pub control_service: Arc<ControlService<A, Arc<R>>>,
}

impl<A, R> Clone for AppState<A, R> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
            timer_service: Arc::clone(&self.timer_service),
            control_service: Arc::clone(&self.control_service),
        }
    }
}

impl<A, R> AppState<A, R>
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    /// Create a new application state.
    ///
    /// The coordinator is taken as an `Arc` because both services and the
    /// polling task share it; the resolver is shared by both services.
    pub fn new(coordinator: Arc<DeviceCoordinator<A>>, resolver: R) -> Self {
        let resolver = Arc::new(resolver);
        let timer_service = TimerService::new(Arc::clone(&coordinator), Arc::clone(&resolver));
        let control_service = ControlService::new(Arc::clone(&coordinator), resolver);
        Self {
            coordinator,
            timer_service: Arc::new(timer_service),
            control_service: Arc::new(control_service),
        }
    }
}
