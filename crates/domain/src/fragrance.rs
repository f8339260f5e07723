//! Fragrance bays and scent-left estimation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::device::lenient_string;
use crate::time::Timestamp;

/// Cartridge metadata from the fragrance catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragrance {
    #[serde(default)]
    pub name: Option<String>,
    /// Rated life of a full cartridge, in hours of diffusion.
    #[serde(default)]
    pub expected_life_hours: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Scent left as measured by the device itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remaining {
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One fragrance bay of a diffuser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bay {
    /// Cartridge code; empty or absent when the bay is empty.
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub fragrance: Option<Fragrance>,
    /// Seconds the cartridge has diffused, as last synced.
    #[serde(default)]
    pub wearing_time: i64,
    /// Unix seconds since which the bay has been diffusing.
    #[serde(default)]
    pub active_at: Option<i64>,
    #[serde(default)]
    pub remaining: Option<Remaining>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bay {
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.code.as_deref().is_some_and(|code| !code.is_empty())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active_at.is_some_and(|at| at != 0)
    }

    /// Fragrance name, or a placeholder built from the cartridge code.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.fragrance
            .as_ref()
            .and_then(|f| f.name.clone())
            .unwrap_or_else(|| format!("Fragrance: {}", self.code.as_deref().unwrap_or_default()))
    }

    /// Accumulated runtime in seconds.
    ///
    /// Devices that have not checked in since activation do not sync
    /// `wearingTime`, so the live activation span is added on top.
    #[must_use]
    pub fn runtime(&self, last_connected_at: Option<i64>, now: Timestamp) -> i64 {
        let synced = last_connected_at.is_some_and(|at| at != 0);
        match self.active_at.filter(|at| *at != 0) {
            Some(active_at) if !synced => self
                .wearing_time
                .saturating_add(now.timestamp().saturating_sub(active_at)),
            _ => self.wearing_time,
        }
    }

    /// Percentage of scent left.
    ///
    /// Uses the device's own measurement when present, otherwise estimates
    /// from runtime against the cartridge's rated life.
    #[must_use]
    pub fn remaining_percent(&self, last_connected_at: Option<i64>, now: Timestamp) -> Option<f64> {
        if let Some(percent) = self.remaining.as_ref().and_then(|r| r.percent) {
            return Some(percent);
        }
        let hours = self
            .fragrance
            .as_ref()
            .and_then(|f| f.expected_life_hours)
            .filter(|h| *h > 0.0)?;
        let expected = hours * 3600.0;
        #[allow(clippy::cast_precision_loss)]
        let runtime = self.runtime(last_connected_at, now) as f64;
        Some((expected - runtime).max(0.0) / expected * 100.0)
    }
}
