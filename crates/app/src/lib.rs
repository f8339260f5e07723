//! # purahub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PuraApi` — fetch device records and send timer and control commands
//!     to the Pura cloud
//!   - `TargetResolver` — map device/entity references to Pura device ids
//! - Define **driving/inbound** use-cases:
//!   - `DeviceCoordinator` — owns the device snapshot, polls and applies pushed changes
//!   - `TimerService` — validates and dispatches `start_timer` requests
//!   - `ControlService` — validates and dispatches direct controls (fragrance
//!     selection, intensity, away/ambient modes, nightlight)
//! - Provide **in-process infrastructure** (entity registry) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `purahub-domain` only (plus `tokio::sync` for locks and
//! `tokio::time` for polling).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod registry;
pub mod services;
