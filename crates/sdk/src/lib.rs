//! Keyq SDK - Rust Client Library
//!
//! Provides a convenient client for a running Keyq broker daemon.
//!
//! # Example
//!
//! ```no_run
//! use keyq_sdk::KeyqClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KeyqClient::connect("http://127.0.0.1:9527").await?;
//!
//!     client.add_queue("jobs", false).await?;
//!     client.push("jobs", "payload bytes").await?;
//!
//!     let popped = client.pop("jobs").await?;
//!     println!("{} -> {} bytes", popped.key, popped.value.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
pub mod error;
mod types;

pub use client::KeyqClient;
pub use error::{Result, SdkError};
pub use types::{
    ExportResponse, HealthResponse, ImportResponse, KeyResponse, Payload, PayloadResponse,
    SetMasterResponse,
};
