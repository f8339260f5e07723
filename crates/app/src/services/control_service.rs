//! Control service — fragrance selection, intensity, away and ambient
//! modes, and the nightlight.

use std::sync::Arc;

use serde_json::Value;

use purahub_domain::control::{ControlCommand, ControlRequest};
use purahub_domain::error::PuraError;

use crate::ports::{PuraApi, TargetResolver};
use crate::services::coordinator::DeviceCoordinator;
use crate::services::resolve_devices;

/// Sends direct controls to the devices a request targets.
///
/// Like timers, every device is checked before the first command goes
/// out, and dispatch stops at the first rejection.
pub struct ControlService<A, R> {
    coordinator: Arc<DeviceCoordinator<A>>,
    resolver: R,
}

impl<A: PuraApi, R: TargetResolver> ControlService<A, R> {
    pub fn new(coordinator: Arc<DeviceCoordinator<A>>, resolver: R) -> Self {
        Self {
            coordinator,
            resolver,
        }
    }

    /// Parse a named service call and run it.
    ///
    /// # Errors
    ///
    /// [`PuraError::Validation`] for unknown services and bad fields, then
    /// as [`call`](Self::call).
    pub async fn call_from_data(&self, service: &str, data: &Value) -> Result<usize, PuraError> {
        let request = ControlRequest::from_service_data(service, data)?;
        self.call(request).await
    }

    /// Apply the control to every targeted device.
    ///
    /// Returns the number of commands dispatched.
    ///
    /// # Errors
    ///
    /// - [`PuraError::TargetNotFound`] when the target resolves to nothing.
    /// - [`PuraError::Validation`] when any device refuses the control.
    /// - Whatever [`PuraApi::send_control`] returns, unchanged.
    #[tracing::instrument(
        skip(self, request),
        fields(service = %request.action, target = %request.target)
    )]
    pub async fn call(&self, request: ControlRequest) -> Result<usize, PuraError> {
        let devices = resolve_devices(&self.resolver, &self.coordinator, &request.target).await?;
        let commands = devices
            .iter()
            .map(|device| request.action.command_for(device))
            .collect::<Result<Vec<ControlCommand>, _>>()?;

        for command in &commands {
            self.coordinator.api().send_control(command.clone()).await?;
            tracing::info!(
                device_id = %command.device_id,
                control = ?command.control,
                "control sent"
            );
        }

        if let Err(err) = self.coordinator.refresh().await {
            tracing::warn!(%err, "failed to refresh devices after control");
        }
        Ok(commands.len())
    }
}
