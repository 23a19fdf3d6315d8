use crate::core::probe::Probe;
use crate::domain::probe::ProbeOutput;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub mod local;
pub mod s3;

pub use local::LocalStorage;
pub use s3::S3Storage;

/// An object storage backend able to report on its own health.
///
/// The returned document names the backend under `"type"` and carries a
/// `"status"` of `"healthy"` or `"unhealthy"`, with an `"error"` message in the
/// latter case.
#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    async fn healthcheck(&self) -> Result<Value>;
}

#[derive(Clone)]
pub struct StorageProbe {
    storage: Arc<dyn ObjectStorage>,
}

impl std::fmt::Debug for StorageProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageProbe").finish_non_exhaustive()
    }
}

impl StorageProbe {
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Probe for StorageProbe {
    async fn check(&self) -> Result<ProbeOutput> {
        Ok(ProbeOutput::from_json(self.storage.healthcheck().await?))
    }
}
