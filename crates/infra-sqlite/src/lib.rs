// Keyq Infrastructure - SQLite Adapter
// Implements: QueueRegistry, PayloadStore

mod connection;
mod error;
mod migration;
mod payload_store;
mod queue_registry;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use payload_store::SqlitePayloadStore;
pub use queue_registry::SqliteQueueRegistry;

use keyq_core::QueueStore;
use std::sync::Arc;

/// Queue store over a migrated SQLite pool
pub fn sqlite_queue_store(pool: sqlx::SqlitePool) -> QueueStore {
    QueueStore::new(
        Arc::new(SqliteQueueRegistry::new(pool.clone())),
        Arc::new(SqlitePayloadStore::new(pool)),
    )
}
