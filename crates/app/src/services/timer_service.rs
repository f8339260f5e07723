//! Timer service — the `pura.start_timer` use-case.

use std::sync::Arc;

use serde_json::Value;

use purahub_domain::error::PuraError;
use purahub_domain::time;
use purahub_domain::timer::{TimerCommand, TimerRequest};

use crate::ports::{PuraApi, TargetResolver};
use crate::services::coordinator::DeviceCoordinator;
use crate::services::resolve_devices;

/// Starts fragrance timers on the devices a request targets.
///
/// Every targeted device is validated before the first command goes out,
/// so a request either fails without side effects or starts dispatching.
/// Dispatch stops at the first rejection; commands already accepted by
/// the cloud are not rolled back.
pub struct TimerService<A, R> {
    coordinator: Arc<DeviceCoordinator<A>>,
    resolver: R,
}

impl<A: PuraApi, R: TargetResolver> TimerService<A, R> {
    pub fn new(coordinator: Arc<DeviceCoordinator<A>>, resolver: R) -> Self {
        Self {
            coordinator,
            resolver,
        }
    }

    /// Parse raw service-call data and start the timer.
    ///
    /// # Errors
    ///
    /// See [`start_timer`](Self::start_timer); field errors are reported as
    /// [`PuraError::Validation`].
    pub async fn start_timer_from_data(&self, data: &Value) -> Result<usize, PuraError> {
        let request = TimerRequest::from_service_data(data)?;
        self.start_timer(request).await
    }

    /// Start a fragrance timer on every device the request targets.
    ///
    /// Returns the number of commands dispatched.
    ///
    /// # Errors
    ///
    /// - [`PuraError::TargetNotFound`] when the target resolves to nothing,
    ///   or to a device the coordinator does not know.
    /// - [`PuraError::Validation`] when a device is a car diffuser, has no
    ///   cartridge, or lacks the requested slot.
    /// - Whatever [`PuraApi::set_timer`] returns, unchanged.
    #[tracing::instrument(skip(self, request), fields(target = %request.target))]
    pub async fn start_timer(&self, request: TimerRequest) -> Result<usize, PuraError> {
        let devices = resolve_devices(&self.resolver, &self.coordinator, &request.target).await?;

        let now = time::now();
        let commands = devices
            .iter()
            .map(|device| request.command_for(device, now))
            .collect::<Result<Vec<TimerCommand>, _>>()?;

        for command in &commands {
            self.coordinator.api().set_timer(command.clone()).await?;
            tracing::info!(
                device_id = %command.device_id,
                slot = %command.slot,
                intensity = %command.intensity,
                duration = %command.duration,
                "timer started"
            );
        }

        if let Err(err) = self.coordinator.refresh().await {
            tracing::warn!(%err, "failed to refresh devices after starting timer");
        }
        Ok(commands.len())
    }
}
