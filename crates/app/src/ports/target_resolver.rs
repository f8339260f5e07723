//! Target resolution port — the host platform's device and entity registries.

use std::future::Future;
use std::sync::Arc;

use purahub_domain::error::PuraError;
use purahub_domain::id::DeviceId;
use purahub_domain::target::Target;

/// Maps service-call targets to Pura device ids.
pub trait TargetResolver: Send + Sync {
    /// Resolve `target` to the Pura devices it refers to.
    ///
    /// References that match nothing are skipped; an empty result is not an
    /// error at this level.
    fn resolve(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Vec<DeviceId>, PuraError>> + Send;
}

impl<T: TargetResolver> TargetResolver for Arc<T> {
    fn resolve(
        &self,
        target: &Target,
    ) -> impl Future<Output = Result<Vec<DeviceId>, PuraError>> + Send {
        (**self).resolve(target)
    }
}
