//! Queue Store - the broker core.
//!
//! Composes a [`QueueRegistry`] with a [`PayloadStore`] and serializes every
//! operation behind one store-wide lock. The guard is scoped to each public
//! call, so it is released on every exit path including `?` propagation.
//!
//! `front` is consuming: the payload it returns is removed in the same
//! critical section, giving the same at-most-once guarantee as `pop`.
//!
//! `export` only destroys anything once the payloads are in hand. The log is
//! read first, then the queue is unregistered, then the log is dropped. A
//! failed drop re-registers the queue, so a storage failure leaves every
//! payload reachable.

use crate::domain::{Payload, QueueMeta, QueueName};
use crate::error::{AppError, Result};
use crate::infrastructure::{MemoryPayloadStore, MemoryQueueRegistry};
use crate::port::{Broker, FrontEntry, PayloadStore, QueueRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Named-queue store over pluggable registry and payload backends
pub struct QueueStore {
    registry: Arc<dyn QueueRegistry>,
    payloads: Arc<dyn PayloadStore>,
    lock: Mutex<()>,
}

impl QueueStore {
    pub fn new(registry: Arc<dyn QueueRegistry>, payloads: Arc<dyn PayloadStore>) -> Self {
        Self {
            registry,
            payloads,
            lock: Mutex::new(()),
        }
    }

    /// Store backed by the in-memory adapters
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryQueueRegistry::new()),
            Arc::new(MemoryPayloadStore::new()),
        )
    }

    /// Head payload of `name` without removing it (`NotExists`, `Empty`)
    pub async fn peek(&self, name: &str) -> Result<Payload> {
        let _guard = self.lock.lock().await;
        let queue = self.resolve(name).await?;

        self.payloads
            .peek_oldest(&queue)
            .await?
            .map(|stored| stored.payload)
            .ok_or(AppError::Empty(queue.into_string()))
    }

    /// Number of live payloads in `name` (`NotExists`)
    pub async fn depth(&self, name: &str) -> Result<u64> {
        let _guard = self.lock.lock().await;
        let queue = self.resolve(name).await?;
        self.payloads.len(&queue).await
    }

    // Helpers below assume the caller holds `self.lock`.

    /// Map a raw name onto a registered queue
    ///
    /// A name that fails validation can never have been registered.
    async fn resolve(&self, name: &str) -> Result<QueueName> {
        let queue = QueueName::parse(name).map_err(|_| AppError::NotExists(name.to_string()))?;

        if !self.registry.exists(&queue).await? {
            return Err(AppError::NotExists(name.to_string()));
        }
        Ok(queue)
    }

    async fn create_locked(&self, name: &str, is_master: bool) -> Result<QueueName> {
        let queue = QueueName::parse(name)?;
        self.registry
            .create(&QueueMeta::new(queue.clone(), is_master))
            .await?;

        // Undo the registry entry so a failed create leaves nothing behind
        if let Err(e) = self.payloads.open(&queue).await {
            if let Err(rollback) = self.registry.remove(&queue).await {
                warn!(
                    queue = %queue,
                    error = %rollback,
                    "Failed to roll back registry entry after payload store open failure"
                );
            }
            return Err(e);
        }

        Ok(queue)
    }
}

#[async_trait]
impl Broker for QueueStore {
    async fn add_queue(&self, name: &str, is_master: bool) -> Result<()> {
        let _guard = self.lock.lock().await;
        let queue = self.create_locked(name, is_master).await?;

        info!(queue = %queue, is_master, "Queue created");
        Ok(())
    }

    async fn set_master(&self, name: &str, is_master: bool) -> Result<()> {
        let _guard = self.lock.lock().await;
        let queue = self.resolve(name).await?;
        self.registry.set_master(&queue, is_master).await?;

        debug!(queue = %queue, is_master, "Master flag updated");
        Ok(())
    }

    async fn push(&self, name: &str, payload: Payload) -> Result<()> {
        let _guard = self.lock.lock().await;
        let queue = self.resolve(name).await?;
        let size = payload.len();
        let seq = self.payloads.append(&queue, payload).await?;

        debug!(queue = %queue, seq, size, "Payload pushed");
        Ok(())
    }

    async fn pop(&self, name: &str) -> Result<Payload> {
        let _guard = self.lock.lock().await;
        let queue = self.resolve(name).await?;

        match self.payloads.pop_oldest(&queue).await? {
            Some(stored) => {
                debug!(queue = %queue, seq = stored.seq, "Payload popped");
                Ok(stored.payload)
            }
            None => Err(AppError::Empty(queue.into_string())),
        }
    }

    async fn front(&self) -> Result<FrontEntry> {
        let _guard = self.lock.lock().await;

        for queue in self.registry.list_masters().await? {
            if let Some(stored) = self.payloads.pop_oldest(&queue).await? {
                debug!(queue = %queue, seq = stored.seq, "Front consumed payload");
                return Ok(FrontEntry {
                    queue,
                    payload: stored.payload,
                });
            }
        }

        Err(AppError::NoneFound)
    }

    async fn import(&self, name: &str, is_master: bool, payloads: Vec<Payload>) -> Result<()> {
        let _guard = self.lock.lock().await;
        let queue = self.create_locked(name, is_master).await?;

        let count = payloads.len();
        for payload in payloads {
            self.payloads.append(&queue, payload).await?;
        }

        info!(queue = %queue, is_master, count, "Queue imported");
        Ok(())
    }

    async fn export(&self, name: &str) -> Result<Vec<Payload>> {
        let _guard = self.lock.lock().await;
        let queue = self.resolve(name).await?;

        let payloads = self.payloads.read_all(&queue).await?;
        let meta = self.registry.remove(&queue).await?;

        if let Err(e) = self.payloads.drop_all(&queue).await {
            if let Err(restore) = self.registry.create(&meta).await {
                warn!(
                    queue = %queue,
                    error = %restore,
                    "Failed to re-register queue after payload store drop failure"
                );
            }
            return Err(e);
        }

        info!(queue = %queue, count = payloads.len(), "Queue exported and destroyed");
        Ok(payloads)
    }

    async fn ping(&self) -> Result<()> {
        self.registry.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SequenceNumber, StoredPayload};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::task::JoinSet;

    fn p(body: &'static str) -> Payload {
        Payload::from(body)
    }

    #[tokio::test]
    async fn test_push_then_pop_is_fifo() {
        let store = QueueStore::in_memory();
        store.add_queue("q", false).await.unwrap();

        for body in ["p1", "p2", "p3", "p4"] {
            store.push("q", p(body)).await.unwrap();
        }

        for body in ["p1", "p2", "p3", "p4"] {
            assert_eq!(store.pop("q").await.unwrap(), p(body));
        }
        assert!(matches!(store.pop("q").await, Err(AppError::Empty(_))));
    }

    #[tokio::test]
    async fn test_add_queue_twice_keeps_payloads() {
        let store = QueueStore::in_memory();
        store.add_queue("q", false).await.unwrap();
        store.push("q", p("kept")).await.unwrap();

        let err = store.add_queue("q", true).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(ref n) if n == "q"));

        assert_eq!(store.depth("q").await.unwrap(), 1);
        assert_eq!(store.pop("q").await.unwrap(), p("kept"));
        // Second call did not flip the flag either
        assert!(matches!(store.front().await, Err(AppError::NoneFound)));
    }

    #[tokio::test]
    async fn test_add_queue_rejects_invalid_name() {
        let store = QueueStore::in_memory();

        assert!(matches!(
            store.add_queue("", false).await,
            Err(AppError::InvalidName(_))
        ));
        assert!(matches!(
            store.add_queue("bad name!", false).await,
            Err(AppError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_queue_is_not_exists() {
        let store = QueueStore::in_memory();

        assert!(matches!(
            store.push("ghost", p("x")).await,
            Err(AppError::NotExists(_))
        ));
        assert!(matches!(store.pop("ghost").await, Err(AppError::NotExists(_))));
        assert!(matches!(
            store.set_master("ghost", true).await,
            Err(AppError::NotExists(_))
        ));
        assert!(matches!(
            store.export("ghost").await,
            Err(AppError::NotExists(_))
        ));
        // Names that could never be registered resolve the same way
        assert!(matches!(
            store.pop("no/such").await,
            Err(AppError::NotExists(_))
        ));
    }

    #[tokio::test]
    async fn test_peek_leaves_payload() {
        let store = QueueStore::in_memory();
        store.add_queue("q", false).await.unwrap();
        assert!(matches!(store.peek("q").await, Err(AppError::Empty(_))));

        store.push("q", p("head")).await.unwrap();
        assert_eq!(store.peek("q").await.unwrap(), p("head"));
        assert_eq!(store.pop("q").await.unwrap(), p("head"));
    }

    #[tokio::test]
    async fn test_export_returns_payloads_and_destroys() {
        let store = QueueStore::in_memory();
        store.add_queue("q", true).await.unwrap();
        for body in ["a", "b", "c"] {
            store.push("q", p(body)).await.unwrap();
        }

        let exported = store.export("q").await.unwrap();
        assert_eq!(exported, vec![p("a"), p("b"), p("c")]);

        assert!(matches!(
            store.push("q", p("x")).await,
            Err(AppError::NotExists(_))
        ));
        // Name is free again
        store.add_queue("q", false).await.unwrap();
        assert_eq!(store.depth("q").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_then_front_consumes_in_order() {
        let store = QueueStore::in_memory();
        store.import("q", true, vec![p("a"), p("b")]).await.unwrap();

        let first = store.front().await.unwrap();
        assert_eq!(first.queue.as_str(), "q");
        assert_eq!(first.payload, p("a"));

        let second = store.front().await.unwrap();
        assert_eq!(second.payload, p("b"));

        assert!(matches!(store.front().await, Err(AppError::NoneFound)));
    }

    #[tokio::test]
    async fn test_import_existing_name_fails() {
        let store = QueueStore::in_memory();
        store.add_queue("q", false).await.unwrap();

        let err = store.import("q", true, vec![p("a")]).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(store.depth("q").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_front_ignores_unflagged_queue() {
        let store = QueueStore::in_memory();
        store.add_queue("q", false).await.unwrap();
        store.push("q", p("held")).await.unwrap();

        store.set_master("q", true).await.unwrap();
        store.set_master("q", false).await.unwrap();

        assert!(matches!(store.front().await, Err(AppError::NoneFound)));
        assert_eq!(store.pop("q").await.unwrap(), p("held"));
    }

    #[tokio::test]
    async fn test_front_scans_masters_in_registration_order() {
        let store = QueueStore::in_memory();
        store.add_queue("first", true).await.unwrap();
        store.add_queue("plain", false).await.unwrap();
        store.add_queue("second", true).await.unwrap();

        store.push("plain", p("skip")).await.unwrap();
        store.push("second", p("s1")).await.unwrap();

        // "first" is empty, so the scan moves on to "second"
        let entry = store.front().await.unwrap();
        assert_eq!(entry.queue.as_str(), "second");
        assert_eq!(entry.payload, p("s1"));

        store.push("second", p("s2")).await.unwrap();
        store.push("first", p("f1")).await.unwrap();
        assert_eq!(store.front().await.unwrap().queue.as_str(), "first");
        assert_eq!(store.front().await.unwrap().payload, p("s2"));
    }

    #[tokio::test]
    async fn test_concurrent_pops_no_duplicates_no_loss() {
        let store = Arc::new(QueueStore::in_memory());
        store.add_queue("work", false).await.unwrap();

        let total = 200;
        for i in 0..total {
            store
                .push("work", Payload::from(format!("job-{}", i).into_bytes()))
                .await
                .unwrap();
        }

        let mut set = JoinSet::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            set.spawn(async move {
                let mut taken = Vec::new();
                loop {
                    match store.pop("work").await {
                        Ok(payload) => taken.push(payload),
                        Err(AppError::Empty(_)) => break,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                taken
            });
        }

        let mut all = Vec::new();
        while let Some(res) = set.join_next().await {
            all.extend(res.unwrap());
        }

        assert_eq!(all.len(), total);
        let mut unique: Vec<Vec<u8>> = all.iter().map(|p| p.as_bytes().to_vec()).collect();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), total);
    }

    /// Payload store whose writes fail on demand
    #[derive(Default)]
    struct FlakyPayloadStore {
        inner: MemoryPayloadStore,
        fail_open: AtomicBool,
        fail_append: AtomicBool,
        fail_drop: AtomicBool,
    }

    fn fail_if(flag: &AtomicBool) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(AppError::Storage("disk unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    #[async_trait]
    impl PayloadStore for FlakyPayloadStore {
        async fn open(&self, queue: &QueueName) -> Result<()> {
            fail_if(&self.fail_open)?;
            self.inner.open(queue).await
        }

        async fn append(&self, queue: &QueueName, payload: Payload) -> Result<SequenceNumber> {
            fail_if(&self.fail_append)?;
            self.inner.append(queue, payload).await
        }

        async fn peek_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>> {
            self.inner.peek_oldest(queue).await
        }

        async fn pop_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>> {
            self.inner.pop_oldest(queue).await
        }

        async fn read_all(&self, queue: &QueueName) -> Result<Vec<Payload>> {
            self.inner.read_all(queue).await
        }

        async fn drain_all(&self, queue: &QueueName) -> Result<Vec<Payload>> {
            self.inner.drain_all(queue).await
        }

        async fn drop_all(&self, queue: &QueueName) -> Result<()> {
            fail_if(&self.fail_drop)?;
            self.inner.drop_all(queue).await
        }

        async fn len(&self, queue: &QueueName) -> Result<u64> {
            self.inner.len(queue).await
        }
    }

    #[tokio::test]
    async fn test_storage_failure_releases_lock_and_leaves_no_registry_entry() {
        let payloads = Arc::new(FlakyPayloadStore::default());
        let store = QueueStore::new(Arc::new(MemoryQueueRegistry::new()), payloads.clone());

        store.add_queue("healthy", false).await.unwrap();
        store.push("healthy", p("h")).await.unwrap();

        payloads.fail_open.store(true, Ordering::SeqCst);
        payloads.fail_append.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.add_queue("doomed", false).await,
            Err(AppError::Storage(_))
        ));
        assert!(matches!(
            store.push("healthy", p("lost")).await,
            Err(AppError::Storage(_))
        ));

        payloads.fail_open.store(false, Ordering::SeqCst);
        payloads.fail_append.store(false, Ordering::SeqCst);

        // Lock was released and the failed create was rolled back
        store.add_queue("doomed", false).await.unwrap();
        assert_eq!(store.pop("healthy").await.unwrap(), p("h"));
        assert!(matches!(store.pop("healthy").await, Err(AppError::Empty(_))));
    }

    #[tokio::test]
    async fn test_import_failure_leaves_partial_queue() {
        let payloads = Arc::new(FlakyPayloadStore::default());
        let store = QueueStore::new(Arc::new(MemoryQueueRegistry::new()), payloads.clone());

        payloads.fail_append.store(true, Ordering::SeqCst);
        let err = store
            .import("partial", true, vec![p("a"), p("b")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        payloads.fail_append.store(false, Ordering::SeqCst);

        // Queue stays registered; the caller cleans up with export
        assert!(matches!(
            store.add_queue("partial", true).await,
            Err(AppError::AlreadyExists(_))
        ));
        assert!(store.export("partial").await.unwrap().is_empty());
        store.import("partial", true, vec![p("a"), p("b")]).await.unwrap();
        assert_eq!(store.depth("partial").await.unwrap(), 2);
    }

    /// Registry whose removals fail on demand
    #[derive(Default)]
    struct FlakyQueueRegistry {
        inner: MemoryQueueRegistry,
        fail_remove: AtomicBool,
    }

    #[async_trait]
    impl QueueRegistry for FlakyQueueRegistry {
        async fn create(&self, meta: &QueueMeta) -> Result<()> {
            self.inner.create(meta).await
        }

        async fn set_master(&self, name: &QueueName, is_master: bool) -> Result<()> {
            self.inner.set_master(name, is_master).await
        }

        async fn exists(&self, name: &QueueName) -> Result<bool> {
            self.inner.exists(name).await
        }

        async fn list_masters(&self) -> Result<Vec<QueueName>> {
            self.inner.list_masters().await
        }

        async fn remove(&self, name: &QueueName) -> Result<QueueMeta> {
            fail_if(&self.fail_remove)?;
            self.inner.remove(name).await
        }
    }

    #[tokio::test]
    async fn test_export_drop_failure_keeps_every_payload() {
        let payloads = Arc::new(FlakyPayloadStore::default());
        let store = QueueStore::new(Arc::new(MemoryQueueRegistry::new()), payloads.clone());
        store
            .import("q", true, vec![p("a"), p("b"), p("c")])
            .await
            .unwrap();

        payloads.fail_drop.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.export("q").await,
            Err(AppError::Storage(_))
        ));
        payloads.fail_drop.store(false, Ordering::SeqCst);

        // Still registered as a master with its whole log
        assert_eq!(store.depth("q").await.unwrap(), 3);
        let head = store.front().await.unwrap();
        assert_eq!((head.queue.as_str(), head.payload), ("q", p("a")));

        assert_eq!(store.export("q").await.unwrap(), vec![p("b"), p("c")]);
        assert!(matches!(store.pop("q").await, Err(AppError::NotExists(_))));
    }

    #[tokio::test]
    async fn test_export_remove_failure_keeps_every_payload() {
        let registry = Arc::new(FlakyQueueRegistry::default());
        let store = QueueStore::new(registry.clone(), Arc::new(MemoryPayloadStore::new()));
        store
            .import("q", true, vec![p("a"), p("b"), p("c")])
            .await
            .unwrap();

        registry.fail_remove.store(true, Ordering::SeqCst);
        assert!(matches!(
            store.export("q").await,
            Err(AppError::Storage(_))
        ));
        registry.fail_remove.store(false, Ordering::SeqCst);

        // Front still reaches the master instead of tripping over a missing log
        assert_eq!(store.depth("q").await.unwrap(), 3);
        assert_eq!(store.front().await.unwrap().payload, p("a"));
        assert_eq!(store.export("q").await.unwrap(), vec![p("b"), p("c")]);
    }
}
