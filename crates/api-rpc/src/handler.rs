//! RPC Method Handlers
//!
//! Thin translation from JSON-RPC params to broker operations.

use crate::error::to_rpc_error;
use crate::metrics::GatewayMetrics;
use crate::types::{
    AddQueueRequest, AddQueueResponse, ExportRequest, ExportResponse, HealthResponse,
    ImportRequest, ImportResponse, PayloadResponse, PopRequest, PushRequest, PushResponse,
    SetMasterRequest, SetMasterResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use keyq_core::error::AppError;
use keyq_core::port::Broker;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Log at a level matching the error kind, then convert
fn reject(method: &str, key: Option<&str>, err: AppError) -> ErrorObjectOwned {
    match &err {
        AppError::Storage(_) | AppError::Internal(_) | AppError::Config(_) => {
            warn!(method, key, error = %err, "Broker call failed")
        }
        _ => debug!(method, key, kind = err.kind(), "Broker call rejected"),
    }
    to_rpc_error(err)
}

/// RPC Handler with injected broker
pub struct RpcHandler {
    broker: Arc<dyn Broker>,
    metrics: Arc<GatewayMetrics>,
}

impl RpcHandler {
    pub fn new(broker: Arc<dyn Broker>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { broker, metrics }
    }

    /// Time a broker call, count its outcome, convert its error
    async fn observe<T>(
        &self,
        method: &'static str,
        key: Option<&str>,
        call: impl Future<Output = keyq_core::Result<T>>,
    ) -> Result<T, ErrorObjectOwned> {
        let started = Instant::now();
        let outcome = call.await;

        let kind = outcome.as_ref().err().map(AppError::kind);
        self.metrics.record(method, started.elapsed(), kind);

        outcome.map_err(|e| reject(method, key, e))
    }

    /// queue.add.v1
    pub async fn add_queue(
        &self,
        params: AddQueueRequest,
    ) -> Result<AddQueueResponse, ErrorObjectOwned> {
        self.observe(
            "queue.add.v1",
            Some(&params.key),
            self.broker.add_queue(&params.key, params.is_master),
        )
        .await?;

        Ok(AddQueueResponse { key: params.key })
    }

    /// queue.set_master.v1
    pub async fn set_master(
        &self,
        params: SetMasterRequest,
    ) -> Result<SetMasterResponse, ErrorObjectOwned> {
        self.observe(
            "queue.set_master.v1",
            Some(&params.key),
            self.broker.set_master(&params.key, params.master_status),
        )
        .await?;

        Ok(SetMasterResponse {
            key: params.key,
            is_master: params.master_status,
        })
    }

    /// queue.push.v1
    pub async fn push(&self, params: PushRequest) -> Result<PushResponse, ErrorObjectOwned> {
        let PushRequest { key, value } = params;
        self.observe("queue.push.v1", Some(&key), self.broker.push(&key, value))
            .await?;

        Ok(PushResponse { key })
    }

    /// queue.pop.v1
    pub async fn pop(&self, params: PopRequest) -> Result<PayloadResponse, ErrorObjectOwned> {
        let value = self
            .observe("queue.pop.v1", Some(&params.key), self.broker.pop(&params.key))
            .await?;

        Ok(PayloadResponse {
            key: params.key,
            value,
        })
    }

    /// queue.front.v1
    pub async fn front(&self) -> Result<PayloadResponse, ErrorObjectOwned> {
        let entry = self
            .observe("queue.front.v1", None, self.broker.front())
            .await?;

        Ok(PayloadResponse {
            key: entry.queue.into_string(),
            value: entry.payload,
        })
    }

    /// queue.import.v1
    pub async fn import(&self, params: ImportRequest) -> Result<ImportResponse, ErrorObjectOwned> {
        let ImportRequest {
            key,
            is_master,
            values,
        } = params;
        let imported = values.len();
        info!(key = %key, count = imported, "Import request");

        self.observe(
            "queue.import.v1",
            Some(&key),
            self.broker.import(&key, is_master, values),
        )
        .await?;

        Ok(ImportResponse { key, imported })
    }

    /// queue.export.v1
    pub async fn export(&self, params: ExportRequest) -> Result<ExportResponse, ErrorObjectOwned> {
        let values = self
            .observe(
                "queue.export.v1",
                Some(&params.key),
                self.broker.export(&params.key),
            )
            .await?;

        Ok(ExportResponse {
            key: params.key,
            values,
        })
    }

    /// admin.health.v1
    pub async fn health(&self) -> Result<HealthResponse, ErrorObjectOwned> {
        self.observe("admin.health.v1", None, self.broker.ping())
            .await?;

        Ok(HealthResponse {
            status: "ok".to_string(),
            version: keyq_core::VERSION.to_string(),
        })
    }

    /// admin.metrics.v1 (Prometheus text exposition)
    pub fn metrics(&self) -> Result<String, ErrorObjectOwned> {
        self.metrics
            .render()
            .map_err(|e| reject("admin.metrics.v1", None, AppError::Internal(e.to_string())))
    }
}
