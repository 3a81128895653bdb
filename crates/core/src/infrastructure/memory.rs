//! In-memory registry and payload store.
//!
//! Fully functional adapters for tests, development and the daemon's
//! `memory` backend. Nothing survives a restart.

use crate::domain::{Payload, QueueMeta, QueueName, SequenceNumber, StoredPayload};
use crate::error::{AppError, Result};
use crate::port::{PayloadStore, QueueRegistry};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

fn poisoned(what: &str) -> AppError {
    AppError::Internal(format!("{} lock poisoned", what))
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct RegistryEntry {
    /// Registration order, used to list masters deterministically
    ordinal: u64,
    is_master: bool,
}

#[derive(Default)]
struct RegistryState {
    next_ordinal: u64,
    entries: HashMap<QueueName, RegistryEntry>,
}

/// HashMap-backed [`QueueRegistry`]
#[derive(Default)]
pub struct MemoryQueueRegistry {
    state: Mutex<RegistryState>,
}

impl MemoryQueueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, RegistryState>> {
        self.state.lock().map_err(|_| poisoned("registry"))
    }
}

#[async_trait]
impl QueueRegistry for MemoryQueueRegistry {
    async fn create(&self, meta: &QueueMeta) -> Result<()> {
        let mut state = self.state()?;

        if state.entries.contains_key(&meta.name) {
            return Err(AppError::AlreadyExists(meta.name.to_string()));
        }

        let ordinal = state.next_ordinal;
        state.next_ordinal += 1;
        state.entries.insert(
            meta.name.clone(),
            RegistryEntry {
                ordinal,
                is_master: meta.is_master,
            },
        );
        Ok(())
    }

    async fn set_master(&self, name: &QueueName, is_master: bool) -> Result<()> {
        let mut state = self.state()?;
        let entry = state
            .entries
            .get_mut(name)
            .ok_or_else(|| AppError::NotExists(name.to_string()))?;
        entry.is_master = is_master;
        Ok(())
    }

    async fn exists(&self, name: &QueueName) -> Result<bool> {
        Ok(self.state()?.entries.contains_key(name))
    }

    async fn list_masters(&self) -> Result<Vec<QueueName>> {
        let state = self.state()?;
        let mut masters: Vec<(u64, &QueueName)> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_master)
            .map(|(name, entry)| (entry.ordinal, name))
            .collect();
        masters.sort_unstable_by_key(|(ordinal, _)| *ordinal);

        Ok(masters.into_iter().map(|(_, name)| name.clone()).collect())
    }

    async fn remove(&self, name: &QueueName) -> Result<QueueMeta> {
        self.state()?
            .entries
            .remove(name)
            .map(|entry| QueueMeta::new(name.clone(), entry.is_master))
            .ok_or_else(|| AppError::NotExists(name.to_string()))
    }
}

// ============================================================================
// Payload store
// ============================================================================

struct PayloadLog {
    next_seq: SequenceNumber,
    entries: VecDeque<StoredPayload>,
}

impl PayloadLog {
    fn new() -> Self {
        Self {
            next_seq: 1,
            entries: VecDeque::new(),
        }
    }
}

/// VecDeque-per-queue [`PayloadStore`]
#[derive(Default)]
pub struct MemoryPayloadStore {
    logs: Mutex<HashMap<QueueName, PayloadLog>>,
}

impl MemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_log<T>(
        &self,
        queue: &QueueName,
        f: impl FnOnce(&mut PayloadLog) -> T,
    ) -> Result<T> {
        let mut logs = self.logs.lock().map_err(|_| poisoned("payload store"))?;
        let log = logs
            .get_mut(queue)
            .ok_or_else(|| AppError::NotExists(queue.to_string()))?;
        Ok(f(log))
    }
}

#[async_trait]
impl PayloadStore for MemoryPayloadStore {
    async fn open(&self, queue: &QueueName) -> Result<()> {
        let mut logs = self.logs.lock().map_err(|_| poisoned("payload store"))?;
        if logs.contains_key(queue) {
            return Err(AppError::AlreadyExists(queue.to_string()));
        }
        logs.insert(queue.clone(), PayloadLog::new());
        Ok(())
    }

    async fn append(&self, queue: &QueueName, payload: Payload) -> Result<SequenceNumber> {
        self.with_log(queue, |log| {
            let seq = log.next_seq;
            log.next_seq += 1;
            log.entries.push_back(StoredPayload { seq, payload });
            seq
        })
    }

    async fn peek_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>> {
        self.with_log(queue, |log| log.entries.front().cloned())
    }

    async fn pop_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>> {
        self.with_log(queue, |log| log.entries.pop_front())
    }

    async fn read_all(&self, queue: &QueueName) -> Result<Vec<Payload>> {
        self.with_log(queue, |log| {
            log.entries
                .iter()
                .map(|stored| stored.payload.clone())
                .collect()
        })
    }

    async fn drain_all(&self, queue: &QueueName) -> Result<Vec<Payload>> {
        self.with_log(queue, |log| {
            log.entries.drain(..).map(|stored| stored.payload).collect()
        })
    }

    async fn drop_all(&self, queue: &QueueName) -> Result<()> {
        let mut logs = self.logs.lock().map_err(|_| poisoned("payload store"))?;
        logs.remove(queue)
            .map(|_| ())
            .ok_or_else(|| AppError::NotExists(queue.to_string()))
    }

    async fn len(&self, queue: &QueueName) -> Result<u64> {
        self.with_log(queue, |log| log.entries.len() as u64)
    }
}
