use std::sync::Arc;

use rentvault_core::ContextPolicyRegistry;
use rentvault_storage::Storage;

/// Removes single objects. Any failure is reported as `false`; nothing is retried.
#[derive(Clone)]
pub struct DeletionService {
    registry: Arc<ContextPolicyRegistry>,
    storage: Arc<dyn Storage>,
}

impl DeletionService {
    pub fn new(registry: Arc<ContextPolicyRegistry>, storage: Arc<dyn Storage>) -> Self {
        DeletionService { registry, storage }
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str, target: &str) -> bool {
        let resolution = match self.registry.resolve(target) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot delete from unresolvable target");
                return false;
            }
        };
        let bucket = resolution.bucket();

        match self.storage.remove(bucket, &[path.to_string()]).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %path,
                    "Delete failed"
                );
                false
            }
        }
    }
}
