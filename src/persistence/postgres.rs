//! PostgreSQL blob store over the `ledger_blobs` table.

use async_trait::async_trait;
use sqlx::PgPool;

use super::BlobStore;
use crate::error::StoreError;

const UPSERT_BLOB: &str = "INSERT INTO ledger_blobs (key, value, updated_at) VALUES ($1, $2, now()) \
     ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = now()";

#[derive(Debug, Clone)]
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    /// The pool must already be migrated (see `create_pool_and_migrate`).
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM ledger_blobs WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        sqlx::query(UPSERT_BLOB)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM ledger_blobs WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All blobs land in one database transaction.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(UPSERT_BLOB)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
