//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.
//! Payload values are base64 strings on the wire.

use keyq_core::domain::Payload;
use serde::{Deserialize, Serialize};

/// queue.add.v1 - Create a queue
#[derive(Debug, Deserialize)]
pub struct AddQueueRequest {
    pub key: String,
    #[serde(default)]
    pub is_master: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddQueueResponse {
    pub key: String,
}

/// queue.set_master.v1 - Flip the master flag
#[derive(Debug, Deserialize)]
pub struct SetMasterRequest {
    pub key: String,
    pub master_status: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetMasterResponse {
    pub key: String,
    pub is_master: bool,
}

/// queue.push.v1 - Append a payload
#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub key: String,
    pub value: Payload,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushResponse {
    pub key: String,
}

/// queue.pop.v1 - Remove the head payload
#[derive(Debug, Deserialize)]
pub struct PopRequest {
    pub key: String,
}

/// queue.pop.v1 / queue.front.v1 result
#[derive(Debug, Clone, Serialize)]
pub struct PayloadResponse {
    pub key: String,
    pub value: Payload,
}

/// queue.import.v1 - Create a queue pre-filled with payloads
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub key: String,
    #[serde(default)]
    pub is_master: bool,
    pub values: Vec<Payload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub key: String,
    pub imported: usize,
}

/// queue.export.v1 - Drain and destroy a queue
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub key: String,
    pub values: Vec<Payload>,
}

/// admin.health.v1
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
