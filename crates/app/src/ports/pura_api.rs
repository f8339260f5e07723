//! Pura cloud port — the vendor collaborator that owns the devices.

use std::future::Future;

use purahub_domain::control::ControlCommand;
use purahub_domain::device::PuraDevice;
use purahub_domain::error::PuraError;
use purahub_domain::timer::TimerCommand;

/// Access to the Pura cloud account the hub is linked to.
///
/// Authentication and transport are the implementation's business.
/// Failures from [`set_timer`](Self::set_timer) and
/// [`send_control`](Self::send_control) should be reported as
/// [`PuraError::DeviceCommand`]; callers pass them through untouched.
pub trait PuraApi: Send + Sync {
    /// Fetch every device record on the account.
    fn get_devices(&self) -> impl Future<Output = Result<Vec<PuraDevice>, PuraError>> + Send;

    /// Start a fragrance timer on one device.
    fn set_timer(
        &self,
        command: TimerCommand,
    ) -> impl Future<Output = Result<(), PuraError>> + Send;

    /// Apply a direct control to one device.
    fn send_control(
        &self,
        command: ControlCommand,
    ) -> impl Future<Output = Result<(), PuraError>> + Send;
}
