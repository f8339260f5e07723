//! Device coordinator — owner of the latest device snapshot.

use std::time::Duration;

use tokio::sync::RwLock;

use purahub_domain::device::PuraDevice;
use purahub_domain::error::{PuraError, ValidationError};
use purahub_domain::id::DeviceId;
use purahub_domain::message::PushMessage;

use crate::ports::PuraApi;

/// Interval between two polls of the Pura cloud.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Keeps the device records fetched from the Pura cloud and keeps them
/// current, by polling and by applying pushed change messages.
pub struct DeviceCoordinator<A> {
    api: A,
    devices: RwLock<Vec<PuraDevice>>,
}

impl<A: PuraApi> DeviceCoordinator<A> {
    /// Create a coordinator with an empty snapshot.
    ///
    /// Call [`refresh`](Self::refresh) once before serving requests.
    pub fn new(api: A) -> Self {
        Self {
            api,
            devices: RwLock::new(Vec::new()),
        }
    }

    /// The vendor collaborator this coordinator reads from.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch all devices and replace the snapshot.
    ///
    /// An empty response keeps the previous snapshot. Returns the number of
    /// devices held afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`PuraApi::get_devices`].
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, PuraError> {
        let fresh = self.api.get_devices().await?;
        let mut devices = self.devices.write().await;
        if fresh.is_empty() {
            tracing::debug!("no devices returned, keeping previous snapshot");
            return Ok(devices.len());
        }
        let changed = fresh.iter().filter(|d| !devices.contains(d)).count();
        tracing::debug!(count = fresh.len(), changed, "devices updated");
        *devices = fresh;
        Ok(devices.len())
    }

    /// Snapshot of every known device.
    pub async fn devices(&self) -> Vec<PuraDevice> {
        self.devices.read().await.clone()
    }

    /// Look up one device by id.
    pub async fn get_device(&self, id: &DeviceId) -> Option<PuraDevice> {
        self.devices
            .read()
            .await
            .iter()
            .find(|d| &d.device_id == id)
            .cloned()
    }

    /// Apply a pushed change message to the snapshot.
    ///
    /// Returns `Ok(false)` when the message is not understood or names a
    /// device that is not in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedRecord`] if the merged record no
    /// longer decodes. The snapshot keeps the previous record.
    pub async fn handle_message(&self, message: &PushMessage) -> Result<bool, PuraError> {
        let (Some(change), Some(id)) = (message.change(), message.device_id.as_ref()) else {
            tracing::warn!(?message, "received unknown update");
            return Ok(false);
        };
        let mut devices = self.devices.write().await;
        let Some(device) = devices.iter_mut().find(|d| &d.device_id == id) else {
            tracing::warn!(device_id = %id, "received update for unknown device");
            return Ok(false);
        };
        let before = device.clone();
        device
            .apply(change)
            .map_err(|err| ValidationError::MalformedRecord(err.to_string()))?;
        tracing::debug!(
            device_id = %id,
            changed = before != *device,
            "applied pushed update"
        );
        Ok(true)
    }

    /// Refresh forever on a fixed interval, handing each fresh snapshot to
    /// `on_update`.
    ///
    /// The first refresh happens one `interval` after the call. Failures are
    /// logged and the loop carries on with the next tick.
    pub async fn run_polling<F>(&self, interval: Duration, mut on_update: F)
    where
        F: FnMut(&[PuraDevice]) + Send,
    {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.refresh().await {
                Ok(_) => on_update(&self.devices.read().await),
                Err(err) => tracing::error!(%err, "failed to update Pura devices"),
            }
        }
    }
}
