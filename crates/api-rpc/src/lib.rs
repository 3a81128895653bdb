//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 request gateway for the Keyq broker.

pub mod error;
pub mod handler;
pub mod metrics;
pub mod server;
pub mod types;

pub use metrics::GatewayMetrics;
pub use server::{RpcServer, RpcServerConfig};
