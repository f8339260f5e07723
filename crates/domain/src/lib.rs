//! # purahub-domain
//!
//! Pure domain model for purahub, a control hub for Pura fragrance diffusers.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **timer requests** (target, slot, intensity, duration) and the
//!   per-device **timer commands** derived from them
//! - Define **device records** as reported by the Pura cloud, with the
//!   readings derived from them (scent left, runtime, model name, …)
//! - Define **controls** (fragrance selection, intensity, away and ambient
//!   modes, nightlight) and the guards that apply per device
//! - Slot auto-selection, deep merge of pushed updates, diagnostics redaction
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod control;
pub mod device;
pub mod diagnostics;
pub mod duration;
pub mod fragrance;
pub mod intensity;
pub mod merge;
pub mod message;
pub mod slot;
pub mod target;
pub mod timer;

mod value;
