// SQLite PayloadStore Implementation
//
// All queues share the `payloads` table keyed by (queue, seq). The queue name is
// always a bound parameter, never part of the SQL text.

use crate::error::{is_unique_violation, map_sqlx_error};
use async_trait::async_trait;
use keyq_core::domain::{Payload, QueueName, SequenceNumber, StoredPayload};
use keyq_core::error::{AppError, Result};
use keyq_core::port::PayloadStore;
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqlitePayloadStore {
    pool: SqlitePool,
}

impl SqlitePayloadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `NotExists` unless the queue's log was opened
    async fn ensure_log(&self, queue: &QueueName) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payload_logs WHERE queue = ?)")
                .bind(queue.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotExists(queue.to_string()))
        }
    }
}

#[async_trait]
impl PayloadStore for SqlitePayloadStore {
    async fn open(&self, queue: &QueueName) -> Result<()> {
        sqlx::query("INSERT INTO payload_logs (queue, next_seq) VALUES (?, 1)")
            .bind(queue.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::AlreadyExists(queue.to_string())
                } else {
                    map_sqlx_error(e)
                }
            })?;

        Ok(())
    }

    async fn append(&self, queue: &QueueName, payload: Payload) -> Result<SequenceNumber> {
        // Counter bump and insert commit together, so a seq is never handed out twice
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let seq: Option<i64> = sqlx::query_scalar(
            "UPDATE payload_logs SET next_seq = next_seq + 1 WHERE queue = ? RETURNING next_seq - 1",
        )
        .bind(queue.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let seq = seq.ok_or_else(|| AppError::NotExists(queue.to_string()))?;

        sqlx::query("INSERT INTO payloads (queue, seq, body) VALUES (?, ?, ?)")
            .bind(queue.as_str())
            .bind(seq)
            .bind(payload.as_bytes())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(seq)
    }

    async fn peek_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>> {
        let row = sqlx::query_as::<_, PayloadRow>(
            "SELECT seq, body FROM payloads WHERE queue = ? ORDER BY seq ASC LIMIT 1",
        )
        .bind(queue.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(Some(row.into_stored())),
            None => self.ensure_log(queue).await.map(|_| None),
        }
    }

    async fn pop_oldest(&self, queue: &QueueName) -> Result<Option<StoredPayload>> {
        // Single statement: select-and-delete cannot interleave with another pop
        let row = sqlx::query_as::<_, PayloadRow>(
            r#"
            DELETE FROM payloads
            WHERE queue = ?
              AND seq = (SELECT MIN(seq) FROM payloads WHERE queue = ?)
            RETURNING seq, body
            "#,
        )
        .bind(queue.as_str())
        .bind(queue.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(Some(row.into_stored())),
            None => self.ensure_log(queue).await.map(|_| None),
        }
    }

    async fn read_all(&self, queue: &QueueName) -> Result<Vec<Payload>> {
        self.ensure_log(queue).await?;

        let rows: Vec<PayloadRow> =
            sqlx::query_as("SELECT seq, body FROM payloads WHERE queue = ? ORDER BY seq ASC")
                .bind(queue.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        debug!(queue = %queue, count = rows.len(), "Read payload log");
        Ok(rows.into_iter().map(|row| row.into_stored().payload).collect())
    }

    async fn drain_all(&self, queue: &QueueName) -> Result<Vec<Payload>> {
        self.ensure_log(queue).await?;

        // Single statement: nothing appended concurrently is half-taken
        let mut rows: Vec<PayloadRow> =
            sqlx::query_as("DELETE FROM payloads WHERE queue = ? RETURNING seq, body")
                .bind(queue.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        rows.sort_unstable_by_key(|row| row.seq);

        debug!(queue = %queue, count = rows.len(), "Drained payload log");
        Ok(rows.into_iter().map(|row| row.into_stored().payload).collect())
    }

    async fn drop_all(&self, queue: &QueueName) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM payloads WHERE queue = ?")
            .bind(queue.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let result = sqlx::query("DELETE FROM payload_logs WHERE queue = ?")
            .bind(queue.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Err(AppError::NotExists(queue.to_string()));
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn len(&self, queue: &QueueName) -> Result<u64> {
        self.ensure_log(queue).await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payloads WHERE queue = ?")
            .bind(queue.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count as u64)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct PayloadRow {
    seq: i64,
    body: Vec<u8>,
}

impl PayloadRow {
    fn into_stored(self) -> StoredPayload {
        StoredPayload {
            seq: self.seq,
            payload: Payload::from(self.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn store() -> SqlitePayloadStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqlitePayloadStore::new(pool)
    }

    fn name(s: &str) -> QueueName {
        QueueName::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_append_assigns_per_queue_sequence() {
        let store = store().await;
        let (a, b) = (name("a"), name("b"));
        store.open(&a).await.unwrap();
        store.open(&b).await.unwrap();

        assert_eq!(store.append(&a, Payload::from("a1")).await.unwrap(), 1);
        assert_eq!(store.append(&a, Payload::from("a2")).await.unwrap(), 2);
        assert_eq!(store.append(&b, Payload::from("b1")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_twice_is_already_exists() {
        let store = store().await;
        store.open(&name("a")).await.unwrap();
        assert!(matches!(
            store.open(&name("a")).await,
            Err(AppError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_pop_oldest_fifo_and_no_reuse() {
        let store = store().await;
        let q = name("q");
        store.open(&q).await.unwrap();
        store.append(&q, Payload::from("first")).await.unwrap();
        store.append(&q, Payload::from("second")).await.unwrap();

        let head = store.pop_oldest(&q).await.unwrap().unwrap();
        assert_eq!(head.seq, 1);
        assert_eq!(head.payload, Payload::from("first"));

        let next = store.pop_oldest(&q).await.unwrap().unwrap();
        assert_eq!(next.seq, 2);
        assert!(store.pop_oldest(&q).await.unwrap().is_none());

        // Emptied log keeps counting
        assert_eq!(store.append(&q, Payload::from("third")).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_peek_oldest_keeps_payload() {
        let store = store().await;
        let q = name("q");
        store.open(&q).await.unwrap();
        assert!(store.peek_oldest(&q).await.unwrap().is_none());

        store.append(&q, Payload::from(vec![0u8, 1, 2])).await.unwrap();
        let peeked = store.peek_oldest(&q).await.unwrap().unwrap();
        assert_eq!(peeked.payload.as_bytes(), &[0u8, 1, 2]);
        assert_eq!(store.len(&q).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unopened_queue_not_exists() {
        let store = store().await;
        let ghost = name("ghost");

        assert!(matches!(
            store.append(&ghost, Payload::from("x")).await,
            Err(AppError::NotExists(_))
        ));
        assert!(matches!(
            store.pop_oldest(&ghost).await,
            Err(AppError::NotExists(_))
        ));
        assert!(matches!(
            store.peek_oldest(&ghost).await,
            Err(AppError::NotExists(_))
        ));
        assert!(matches!(
            store.drop_all(&ghost).await,
            Err(AppError::NotExists(_))
        ));
    }

    #[tokio::test]
    async fn test_read_all_then_drop_all() {
        let store = store().await;
        let (q, other) = (name("q"), name("other"));
        store.open(&q).await.unwrap();
        store.open(&other).await.unwrap();
        for body in ["x", "y", "z"] {
            store.append(&q, Payload::from(body)).await.unwrap();
        }
        store.append(&other, Payload::from("untouched")).await.unwrap();

        let live = store.read_all(&q).await.unwrap();
        assert_eq!(
            live,
            vec![Payload::from("x"), Payload::from("y"), Payload::from("z")]
        );
        // Reading leaves the log intact
        assert_eq!(store.len(&q).await.unwrap(), 3);

        store.drop_all(&q).await.unwrap();
        assert!(matches!(store.len(&q).await, Err(AppError::NotExists(_))));
        assert_eq!(store.len(&other).await.unwrap(), 1);

        // Re-opened log starts a fresh counter
        store.open(&q).await.unwrap();
        assert_eq!(store.append(&q, Payload::from("new")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_drain_all_empties_but_keeps_counter() {
        let store = store().await;
        let q = name("q");
        store.open(&q).await.unwrap();
        for body in ["a", "b", "c"] {
            store.append(&q, Payload::from(body)).await.unwrap();
        }
        store.pop_oldest(&q).await.unwrap();

        let drained = store.drain_all(&q).await.unwrap();
        assert_eq!(drained, vec![Payload::from("b"), Payload::from("c")]);
        assert_eq!(store.len(&q).await.unwrap(), 0);
        assert_eq!(store.append(&q, Payload::from("d")).await.unwrap(), 4);
    }
}
