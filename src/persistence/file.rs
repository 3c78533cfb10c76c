//! Directory-backed blob store: one `<key>.json` file per blob.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::BlobStore;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` for blobs, creating it if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl BlobStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // Write to a sibling temp file, fsync, then rename over the target, so a
    // crash leaves either the old blob or the new one. Temp names are unique
    // per write: an abandoned write may still be running on the blocking pool.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&temp_path, value.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        fs::rename(&temp_path, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_json_files_in_dir() {
        let store = FileStore {
            dir: PathBuf::from("/data"),
        };
        assert_eq!(
            store.path_for("users").unwrap(),
            PathBuf::from("/data/users.json")
        );
        assert!(store.path_for("").is_err());
        assert!(store.path_for("a/b").is_err());
        assert!(store.path_for("..").is_err());
    }
}
