// Queue Registry Port (Interface)

use crate::domain::{QueueMeta, QueueName};
use crate::error::Result;
use async_trait::async_trait;

/// Mapping from queue name to queue metadata
///
/// Implementations are private to the queue store; callers outside core go
/// through [`crate::port::Broker`].
#[async_trait]
pub trait QueueRegistry: Send + Sync {
    /// Register a new queue
    ///
    /// Fails with `AlreadyExists` if the name is registered. Never overwrites.
    async fn create(&self, meta: &QueueMeta) -> Result<()>;

    /// Update the master flag (`NotExists` if unregistered)
    async fn set_master(&self, name: &QueueName, is_master: bool) -> Result<()>;

    /// Pure existence query
    async fn exists(&self, name: &QueueName) -> Result<bool>;

    /// Master-flagged queue names in registration order
    ///
    /// Each call returns a fresh listing; two calls on an unmodified registry
    /// return the same sequence.
    async fn list_masters(&self) -> Result<Vec<QueueName>>;

    /// Delete the registry entry, returning what was removed (`NotExists` if unregistered)
    async fn remove(&self, name: &QueueName) -> Result<QueueMeta>;

    /// Backend liveness check
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
