//! Virtual cloud error types.

use purahub_domain::error::PuraError;
use purahub_domain::id::DeviceId;

/// Errors raised by the simulated Pura cloud.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// No device with this id is on the simulated account.
    #[error("device {0} is not on this account")]
    UnknownDevice(DeviceId),

    /// A failure armed with [`fail_next_command`](crate::VirtualPuraApi::fail_next_command).
    #[error("device {0} rejected the command")]
    Rejected(DeviceId),

    /// A device list could not be decoded.
    #[error("failed to parse device list")]
    Parse(#[source] serde_json::Error),
}

impl VirtualError {
    /// Convert into a [`PuraError`] for propagation across port boundaries.
    pub fn into_domain(self) -> PuraError {
        match self {
            Self::Parse(err) => PuraError::Decode(err),
            other => PuraError::device_command(other),
        }
    }
}

impl From<VirtualError> for PuraError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}
