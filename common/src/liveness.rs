use async_trait::async_trait;

use crate::models::host::Host;

/// Bounded-time reachability check performed before any remote-shell work.
///
/// Implementations must not retry: a single negative answer is final for the run.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_up(&self, host: &Host) -> bool;
}
