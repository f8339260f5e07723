//! # purahub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small **JSON API** over the device snapshot
//!   (`/api/devices`, `/api/diagnostics`)
//! - Expose the **`pura.start_timer` service call** at
//!   `POST /api/services/pura/start_timer`
//! - Expose the **direct controls** (fragrance selection, intensity, away
//!   and ambient modes, nightlight) at `POST /api/services/pura/{service}`
//! - Accept **pushed change messages** at `POST /api/push`
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `purahub-app` (for port traits and services) and `purahub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
