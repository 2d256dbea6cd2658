use std::time::Duration;

use async_trait::async_trait;
use logsweep_common::config::InventoryConfig;
use logsweep_common::error::InventoryError;
use logsweep_common::inventory::{HostRecord, Inventory};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// Management service client listing the hosts of a deployment via `GET {endpoint}/hosts`.
pub struct HttpInventory {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct HostList {
    #[serde(default)]
    items: Vec<HostRecord>,
}

impl HttpInventory {
    pub fn new(config: &InventoryConfig, timeout: Duration) -> Result<Self, InventoryError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(InventoryError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                config.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InventoryError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> InventoryError {
        if e.is_timeout() {
            InventoryError::Timeout(self.timeout)
        } else if e.is_decode() {
            InventoryError::Decode(e.to_string())
        } else {
            InventoryError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Inventory for HttpInventory {
    async fn hosts(&self) -> Result<Vec<HostRecord>, InventoryError> {
        let url: String = format!("{}/hosts", self.endpoint);
        debug!("Querying inventory at {url}");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;
        let status: StatusCode = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(InventoryError::Auth(status.as_u16()));
        }
        if !status.is_success() {
            let message: String = response.text().await.unwrap_or_default();
            return Err(InventoryError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let list: HostList = response.json().await.map_err(|e| self.request_error(e))?;
        Ok(list.items)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
