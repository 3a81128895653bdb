// Keyq Core - Domain Logic, Ports & the Queue Store
// NO database or RPC dependencies (hexagonal architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

pub use application::QueueStore;
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
