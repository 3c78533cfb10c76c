//! Snapshot persistence: the ledger keeps its user set and transaction log as
//! two JSON blobs in a key-value `BlobStore`, rewritten in full on every mutation.

mod file;
mod memory;
mod pool;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::StorageBackend;
use crate::error::StoreError;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use pool::{create_pool_and_migrate, run_migrations};
pub use postgres::PgBlobStore;
pub use sqlx::PgPool;

/// Blob holding every account with its nested positions.
pub const USERS_KEY: &str = "users";
/// Blob holding the full transaction log.
pub const TRANSACTIONS_KEY: &str = "transactions";

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several blobs. The default writes them one after another in the
    /// given order; stores that can commit them atomically override this.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(&key, value).await?;
        }
        Ok(())
    }
}

/// Open the store selected by configuration.
pub async fn open_store(backend: &StorageBackend) -> Result<Arc<dyn BlobStore>, StoreError> {
    match backend {
        StorageBackend::Postgres(url) => {
            let pool = create_pool_and_migrate(url).await?;
            info!("using PostgreSQL blob store");
            Ok(Arc::new(PgBlobStore::new(pool)))
        }
        StorageBackend::Directory(dir) => {
            info!(dir = %dir.display(), "using file blob store");
            Ok(Arc::new(FileStore::open(dir).await?))
        }
        StorageBackend::Memory => {
            info!("using in-memory blob store; state is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
