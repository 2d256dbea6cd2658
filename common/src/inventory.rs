use async_trait::async_trait;
use serde::Deserialize;

use crate::error::InventoryError;

/// A host as reported by the management service. Only the address matters here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostRecord {
    #[serde(default)]
    pub address: Option<String>,
}

impl HostRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }
}

/// Source of dynamically known hosts.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn hosts(&self) -> Result<Vec<HostRecord>, InventoryError>;
}
