// Domain Layer - Pure business logic and entities

pub mod error;
pub mod payload;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use payload::{Payload, SequenceNumber, StoredPayload};
pub use queue::{QueueMeta, QueueName};
