//! In-process device and entity registry.
//!
//! Stands in for the host platform's registries: every Pura device gets the
//! entities the hub exposes for its hardware family, and service-call
//! targets are resolved against them.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

use purahub_domain::device::{DeviceType, PuraDevice};
use purahub_domain::error::PuraError;
use purahub_domain::id::{DeviceId, EntityId};
use purahub_domain::target::Target;

use crate::ports::TargetResolver;

/// `(platform, key)` pairs exposed for a hardware family.
#[must_use]
pub fn entity_keys(device_type: DeviceType) -> &'static [(&'static str, &'static str)] {
    match device_type {
        DeviceType::Wall => &[
            ("binary_sensor", "connected"),
            ("light", "nightlight"),
            ("select", "fragrance"),
            ("select", "intensity"),
            ("sensor", "active_fragrance"),
            ("sensor", "bay_1"),
            ("sensor", "bay_1_fragrance_remaining"),
            ("sensor", "bay_1_runtime"),
            ("sensor", "bay_2"),
            ("sensor", "bay_2_fragrance_remaining"),
            ("sensor", "bay_2_runtime"),
            ("sensor", "controller"),
            ("sensor", "timer"),
            ("switch", "ambient_mode"),
            ("switch", "away_mode"),
        ],
        DeviceType::Plus => &[
            ("binary_sensor", "connected"),
            ("select", "fragrance"),
            ("select", "intensity"),
            ("sensor", "active_fragrance"),
            ("sensor", "bay_1"),
            ("sensor", "bay_1_fragrance_remaining"),
            ("sensor", "bay_1_runtime"),
            ("sensor", "bay_2"),
            ("sensor", "bay_2_fragrance_remaining"),
            ("sensor", "bay_2_runtime"),
            ("sensor", "controller"),
            ("sensor", "timer"),
            ("switch", "away_mode"),
        ],
        DeviceType::Mini => &[
            ("binary_sensor", "connected"),
            ("binary_sensor", "low_fragrance"),
            ("light", "nightlight"),
            ("select", "fragrance"),
            ("select", "intensity"),
            ("sensor", "fragrance"),
            ("sensor", "fragrance_remaining"),
            ("sensor", "runtime"),
            ("sensor", "controller"),
            ("sensor", "timer"),
            ("switch", "away_mode"),
        ],
        DeviceType::Car => &[
            ("binary_sensor", "low_fragrance"),
            ("number", "intensity"),
            ("sensor", "fragrance"),
            ("sensor", "fragrance_remaining"),
            ("sensor", "last_active"),
            ("sensor", "runtime"),
        ],
    }
}

/// An entity owned by a Pura device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredEntity {
    pub entity_id: EntityId,
    /// Stable id, `{device_id}-{key}`.
    pub unique_id: String,
    pub device_id: DeviceId,
    pub key: &'static str,
}

#[derive(Default)]
struct Inner {
    devices: Vec<DeviceId>,
    entities: BTreeMap<EntityId, RegisteredEntity>,
}

/// Thread-safe registry of Pura devices and their entities.
#[derive(Default)]
pub struct EntityRegistry {
    inner: RwLock<Inner>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and its entities. Registering again is a no-op for
    /// entities that already exist.
    ///
    /// Returns the entity ids owned by the device.
    pub fn register_device(&self, device: &PuraDevice) -> Vec<EntityId> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !inner.devices.contains(&device.device_id) {
            inner.devices.push(device.device_id.clone());
        }

        let slug = slugify(&device.title());
        let mut owned = Vec::new();
        for (platform, key) in entity_keys(device.device_type) {
            let unique_id = format!("{}-{key}", device.device_id);
            if let Some(existing) = inner.entities.values().find(|e| e.unique_id == unique_id) {
                owned.push(existing.entity_id.clone());
                continue;
            }
            let entity_id = free_entity_id(&inner.entities, platform, &format!("{slug}_{key}"));
            inner.entities.insert(
                entity_id.clone(),
                RegisteredEntity {
                    entity_id: entity_id.clone(),
                    unique_id,
                    device_id: device.device_id.clone(),
                    key,
                },
            );
            owned.push(entity_id);
        }
        owned
    }

    /// Register every device of a snapshot.
    pub fn sync(&self, devices: &[PuraDevice]) {
        let count: usize = devices.iter().map(|d| self.register_device(d).len()).sum();
        tracing::debug!(devices = devices.len(), entities = count, "registry synced");
    }

    /// Look up one entity.
    #[must_use]
    pub fn entity(&self, entity_id: &EntityId) -> Option<RegisteredEntity> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entities.get(entity_id).cloned()
    }

    /// Entities owned by a device, ordered by entity id.
    #[must_use]
    pub fn entities_for(&self, device_id: &DeviceId) -> Vec<RegisteredEntity> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .entities
            .values()
            .filter(|e| &e.device_id == device_id)
            .cloned()
            .collect()
    }

    fn resolve_now(&self, target: &Target) -> Vec<DeviceId> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let from_devices = target
            .device_ids
            .iter()
            .filter(|id| inner.devices.contains(id))
            .cloned();
        let from_entities = target
            .entity_ids
            .iter()
            .filter_map(|id| inner.entities.get(id).map(|e| e.device_id.clone()));

        let mut resolved: Vec<DeviceId> = Vec::new();
        for id in from_devices.chain(from_entities) {
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
        resolved
    }
}

impl TargetResolver for EntityRegistry {
    fn resolve(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Vec<DeviceId>, PuraError>> + Send {
        let resolved = self.resolve_now(target);
        async move { Ok(resolved) }
    }
}

fn free_entity_id(
    taken: &BTreeMap<EntityId, RegisteredEntity>,
    platform: &str,
    object_id: &str,
) -> EntityId {
    let base = EntityId::new(format!("{platform}.{object_id}"));
    if !taken.contains_key(&base) {
        return base;
    }
    (2..)
        .map(|n| EntityId::new(format!("{platform}.{object_id}_{n}")))
        .find(|id| !taken.contains_key(id))
        .unwrap_or(base)
}

/// Lowercase, with runs of anything but ASCII letters and digits collapsed
/// to a single `_`.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("pura");
    }
    slug
}
