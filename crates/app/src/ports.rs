//! Port definitions — traits that adapters implement.
//!
//! The Pura cloud and the host's target resolution both live outside the
//! application core. Their traits sit in `app` so services depend on the
//! abstraction and adapters depend on `app`, never the other way round.

pub mod pura_api;
pub mod target_resolver;

pub use pura_api::PuraApi;
pub use target_resolver::TargetResolver;
