//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

pub use keyq_core::domain::Payload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddQueueRequest {
    pub key: String,
    pub is_master: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SetMasterRequest {
    pub key: String,
    pub master_status: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PushRequest {
    pub key: String,
    pub value: Payload,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct KeyRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ImportRequest {
    pub key: String,
    pub is_master: bool,
    pub values: Vec<Payload>,
}

/// Acknowledgement carrying the queue key
#[derive(Debug, Clone, Deserialize)]
pub struct KeyResponse {
    pub key: String,
}

/// Response from set_master
#[derive(Debug, Clone, Deserialize)]
pub struct SetMasterResponse {
    pub key: String,
    pub is_master: bool,
}

/// A payload together with the queue it came from (pop / front)
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadResponse {
    pub key: String,
    pub value: Payload,
}

/// Response from import
#[derive(Debug, Clone, Deserialize)]
pub struct ImportResponse {
    pub key: String,
    pub imported: usize,
}

/// Response from export
#[derive(Debug, Clone, Deserialize)]
pub struct ExportResponse {
    pub key: String,
    pub values: Vec<Payload>,
}

/// Response from the health check
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
