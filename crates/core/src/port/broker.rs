// Broker Port - the capability set the request gateway consumes

use crate::domain::{Payload, QueueName};
use crate::error::Result;
use async_trait::async_trait;

/// Head payload taken from a master queue by `front`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontEntry {
    pub queue: QueueName,
    pub payload: Payload,
}

/// Named-queue broker operations
///
/// Names are passed as raw strings; validating them is the implementation's job.
/// Every method returns its value or exactly one [`crate::AppError`] kind.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Create an empty queue (`AlreadyExists`, `InvalidName`)
    async fn add_queue(&self, name: &str, is_master: bool) -> Result<()>;

    /// Flip the master flag (`NotExists`)
    async fn set_master(&self, name: &str, is_master: bool) -> Result<()>;

    /// Append to the tail (`NotExists`)
    async fn push(&self, name: &str, payload: Payload) -> Result<()>;

    /// Remove and return the head (`NotExists`, `Empty`)
    async fn pop(&self, name: &str) -> Result<Payload>;

    /// Consume the head of the first master queue holding a payload (`NoneFound`)
    async fn front(&self) -> Result<FrontEntry>;

    /// Create a queue and push every payload in order
    ///
    /// Not atomic: the first failure is returned and anything already created stays.
    async fn import(&self, name: &str, is_master: bool, payloads: Vec<Payload>) -> Result<()>;

    /// Drain every payload in insertion order and destroy the queue (`NotExists`)
    async fn export(&self, name: &str) -> Result<Vec<Payload>>;

    /// Storage liveness check (`Storage` on failure)
    async fn ping(&self) -> Result<()>;
}
