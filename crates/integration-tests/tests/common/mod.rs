//! Shared fixtures: one queue store per backend

#![allow(dead_code)]

use keyq_core::QueueStore;
use keyq_infra_sqlite::{create_pool, run_migrations, sqlite_queue_store};

/// Fresh stores for every backend, labelled for assertion messages
pub async fn stores() -> Vec<(&'static str, QueueStore)> {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    vec![
        ("memory", QueueStore::in_memory()),
        ("sqlite", sqlite_queue_store(pool)),
    ]
}

/// Unique on-disk database path under the system temp dir
pub fn temp_db_path(test: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("keyq_{}_{}.db", test, std::process::id()))
}

/// Remove a SQLite database and its WAL side files
pub fn remove_db(path: &std::path::Path) {
    let _ = std::fs::remove_file(path);
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let _ = std::fs::remove_file(side);
    }
}
