//! Keyq Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    AddQueueRequest, ExportResponse, HealthResponse, ImportRequest, ImportResponse, KeyRequest,
    KeyResponse, Payload, PayloadResponse, PushRequest, SetMasterRequest, SetMasterResponse,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;

/// Keyq broker client
///
/// Provides a high-level interface to a running `keyq-broker` daemon.
///
/// # Example
///
/// ```no_run
/// use keyq_sdk::KeyqClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = KeyqClient::connect("http://127.0.0.1:9527").await?;
/// client.add_queue("orders", true).await?;
/// client.push("orders", "order-1").await?;
/// let head = client.front().await?;
/// assert_eq!(head.key, "orders");
/// # Ok(())
/// # }
/// ```
pub struct KeyqClient {
    client: HttpClient,
}

impl KeyqClient {
    /// Connect to the broker
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9527`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create a queue
    pub async fn add_queue(&self, key: impl Into<String>, is_master: bool) -> Result<KeyResponse> {
        let params = rpc_params![AddQueueRequest {
            key: key.into(),
            is_master,
        }];
        let response: KeyResponse = self.client.request("queue.add.v1", params).await?;

        Ok(response)
    }

    /// Set or clear the master flag
    pub async fn set_master(
        &self,
        key: impl Into<String>,
        master_status: bool,
    ) -> Result<SetMasterResponse> {
        let params = rpc_params![SetMasterRequest {
            key: key.into(),
            master_status,
        }];
        let response: SetMasterResponse =
            self.client.request("queue.set_master.v1", params).await?;

        Ok(response)
    }

    /// Append a payload to the tail of a queue
    pub async fn push(
        &self,
        key: impl Into<String>,
        value: impl Into<Payload>,
    ) -> Result<KeyResponse> {
        let params = rpc_params![PushRequest {
            key: key.into(),
            value: value.into(),
        }];
        let response: KeyResponse = self.client.request("queue.push.v1", params).await?;

        Ok(response)
    }

    /// Remove and return the head payload of a queue
    pub async fn pop(&self, key: impl Into<String>) -> Result<PayloadResponse> {
        let params = rpc_params![KeyRequest { key: key.into() }];
        let response: PayloadResponse = self.client.request("queue.pop.v1", params).await?;

        Ok(response)
    }

    /// Consume the head payload of the first non-empty master queue
    pub async fn front(&self) -> Result<PayloadResponse> {
        let response: PayloadResponse = self.client.request("queue.front.v1", rpc_params![]).await?;

        Ok(response)
    }

    /// Create a queue pre-filled with `values` in order
    pub async fn import(
        &self,
        key: impl Into<String>,
        is_master: bool,
        values: Vec<Payload>,
    ) -> Result<ImportResponse> {
        let params = rpc_params![ImportRequest {
            key: key.into(),
            is_master,
            values,
        }];
        let response: ImportResponse = self.client.request("queue.import.v1", params).await?;

        Ok(response)
    }

    /// Drain a queue and destroy it
    pub async fn export(&self, key: impl Into<String>) -> Result<ExportResponse> {
        let params = rpc_params![KeyRequest { key: key.into() }];
        let response: ExportResponse = self.client.request("queue.export.v1", params).await?;

        Ok(response)
    }

    /// Daemon and storage liveness
    pub async fn health(&self) -> Result<HealthResponse> {
        let response: HealthResponse = self.client.request("admin.health.v1", rpc_params![]).await?;

        Ok(response)
    }

    /// Gateway request metrics in the Prometheus text format
    pub async fn metrics(&self) -> Result<String> {
        let text: String = self.client.request("admin.metrics.v1", rpc_params![]).await?;

        Ok(text)
    }
}
