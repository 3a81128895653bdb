// SQLite QueueRegistry Implementation

use crate::error::{is_unique_violation, map_sqlx_error};
use async_trait::async_trait;
use keyq_core::domain::{QueueMeta, QueueName};
use keyq_core::error::{AppError, Result};
use keyq_core::port::QueueRegistry;
use sqlx::SqlitePool;

pub struct SqliteQueueRegistry {
    pool: SqlitePool,
}

impl SqliteQueueRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRegistry for SqliteQueueRegistry {
    async fn create(&self, meta: &QueueMeta) -> Result<()> {
        sqlx::query("INSERT INTO queues (name, is_master) VALUES (?, ?)")
            .bind(meta.name.as_str())
            .bind(meta.is_master)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::AlreadyExists(meta.name.to_string())
                } else {
                    map_sqlx_error(e)
                }
            })?;

        Ok(())
    }

    async fn set_master(&self, name: &QueueName, is_master: bool) -> Result<()> {
        let result = sqlx::query("UPDATE queues SET is_master = ? WHERE name = ?")
            .bind(is_master)
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotExists(name.to_string()));
        }
        Ok(())
    }

    async fn exists(&self, name: &QueueName) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM queues WHERE name = ?)")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(exists)
    }

    async fn list_masters(&self) -> Result<Vec<QueueName>> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT name FROM queues WHERE is_master = 1 ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        names
            .into_iter()
            .map(|name| {
                QueueName::parse(name.clone()).map_err(|e| {
                    AppError::Storage(format!("Corrupt queue name {:?} in registry: {}", name, e))
                })
            })
            .collect()
    }

    async fn remove(&self, name: &QueueName) -> Result<QueueMeta> {
        let is_master: Option<bool> =
            sqlx::query_scalar("DELETE FROM queues WHERE name = ? RETURNING is_master")
                .bind(name.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        is_master
            .map(|is_master| QueueMeta::new(name.clone(), is_master))
            .ok_or_else(|| AppError::NotExists(name.to_string()))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
