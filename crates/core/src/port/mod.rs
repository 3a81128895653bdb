// Port Layer - Interfaces for external dependencies

pub mod broker;
pub mod payload_store;
pub mod queue_registry;

// Re-exports
pub use broker::{Broker, FrontEntry};
pub use payload_store::PayloadStore;
pub use queue_registry::QueueRegistry;
