use async_trait::async_trait;

use crate::error::TrustStoreError;

/// Local store of trusted host keys (e.g. an OpenSSH `known_hosts` file).
#[async_trait]
pub trait TrustStore: Send + Sync {
    /// Removes every record for `address` and returns how many were dropped.
    ///
    /// A missing store or an address without records is `Ok(0)`.
    async fn remove(&self, address: &str) -> Result<usize, TrustStoreError>;
}
