use crate::domain::probe::ProbeOutput;
use crate::error::Result;
use async_trait::async_trait;

/// A single read-only liveness check against one dependency.
///
/// Implementations must be safe to call concurrently and must not rely on
/// being polled to completion: the runner cancels probes that overrun their
/// budget.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn check(&self) -> Result<ProbeOutput>;
}
