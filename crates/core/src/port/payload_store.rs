// Payload Store Port (Interface)

use crate::domain::{Payload, QueueName, SequenceNumber, StoredPayload};
use crate::error::Result;
use async_trait::async_trait;

/// Append-only ordered payload storage, one logical log per queue
///
/// Sequence numbers are assigned by the store at append time, start at 1 and
/// are never reused for the lifetime of the log (until `drop_all`).
/// Operations on a queue whose log was never opened fail with `NotExists`.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Allocate an empty log and its sequence counter
    async fn open(&self, queue: &QueueName) -> Result<()>;

    /// Insert at the tail, returning the assigned sequence number
    async fn append(&self, queue: &QueueName, payload: Payload) -> Result<SequenceNumber>;

    /// Lowest live sequence number's payload, without removing it
    async fn peek_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>>;

    /// Atomically return and remove the lowest live sequence number's payload
    ///
    /// Two racing callers never observe the same payload.
    async fn pop_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>>;

    /// Every live payload in ascending sequence order, without removing any
    async fn read_all(&self, queue: &QueueName) -> Result<Vec<Payload>>;

    /// Remove and return every live payload in ascending sequence order
    ///
    /// The log stays open and keeps its sequence counter.
    async fn drain_all(&self, queue: &QueueName) -> Result<Vec<Payload>>;

    /// Destroy all payloads and the backing state for the queue
    ///
    /// All or nothing: on failure the log is left exactly as it was.
    async fn drop_all(&self, queue: &QueueName) -> Result<()>;

    /// Number of live payloads
    async fn len(&self, queue: &QueueName) -> Result<u64>;
}
