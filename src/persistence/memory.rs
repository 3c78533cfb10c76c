//! Process-local blob store. Clones share the same map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BlobStore;
use crate::error::StoreError;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.blobs.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }

    // One lock for the whole batch, so readers never see half of it.
    async fn set_many(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        let mut guard = self.blobs.write().await;
        for (key, value) in entries {
            guard.insert(key, value);
        }
        Ok(())
    }
}
