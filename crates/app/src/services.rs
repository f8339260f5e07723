//! Application services.
//!
//! Services take their collaborators as generic parameters at construction
//! time; no concrete adapter type is named here.

pub mod control_service;
pub mod coordinator;
pub mod timer_service;

use purahub_domain::device::PuraDevice;
use purahub_domain::error::{PuraError, TargetNotFoundError};
use purahub_domain::id::DeviceId;
use purahub_domain::target::Target;

use crate::ports::{PuraApi, TargetResolver};
use crate::services::coordinator::DeviceCoordinator;

/// Resolve `target` to the devices in the coordinator's snapshot, each
/// once, in resolution order.
///
/// # Errors
///
/// [`PuraError::TargetNotFound`] when nothing resolves or when a resolved
/// id is not in the snapshot; resolver errors pass through.
pub(crate) async fn resolve_devices<A, R>(
    resolver: &R,
    coordinator: &DeviceCoordinator<A>,
    target: &Target,
) -> Result<Vec<PuraDevice>, PuraError>
where
    A: PuraApi,
    R: TargetResolver,
{
    let ids = resolver.resolve(target).await?;
    if ids.is_empty() {
        return Err(TargetNotFoundError {
            target: target.to_string(),
        }
        .into());
    }
    let mut devices = Vec::with_capacity(ids.len());
    for id in dedup(ids) {
        let device = coordinator
            .get_device(&id)
            .await
            .ok_or_else(|| TargetNotFoundError {
                target: id.to_string(),
            })?;
        devices.push(device);
    }
    Ok(devices)
}

fn dedup(ids: Vec<DeviceId>) -> Vec<DeviceId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
