//! File-per-key record store

use super::RecordStore;
use crate::entry::{PersistedRecord, RECORD_EXTENSION};
use crate::errors::{CacheError, RecoveryHint, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Outcome of preparing the storage root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStatus {
    Created,
    /// Informational: the directory was already there
    AlreadyExists,
}

/// Stores each record as `<root>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store over an existing root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Prepare `root` and create a store over it
    pub async fn open(root: impl Into<PathBuf>) -> Result<(Self, RootStatus)> {
        let root = root.into();
        let status = Self::ensure_root(&root).await?;
        Ok((Self::new(root), status))
    }

    /// Create the storage root if missing
    ///
    /// Idempotent. Fails with [`CacheError::NotADirectory`] when something
    /// other than a directory already sits at `path`.
    pub async fn ensure_root(path: &Path) -> Result<RootStatus> {
        match fs::metadata(path).await {
            Ok(metadata) if metadata.is_dir() => Ok(RootStatus::AlreadyExists),
            Ok(_) => Err(CacheError::NotADirectory {
                path: path.to_path_buf(),
                recovery_hint: RecoveryHint::Manual {
                    instructions: format!(
                        "Remove '{}' or choose another data directory",
                        path.display()
                    ),
                },
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(path)
                    .await
                    .map_err(|e| CacheError::io(path, "create storage root", e))?;
                Ok(RootStatus::Created)
            }
            Err(e) => Err(CacheError::io(path, "inspect storage root", e)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic location of the record for `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{RECORD_EXTENSION}"))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!(".{}.tmp", uuid::Uuid::new_v4()))
    }

    async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
        let mut file = fs::File::create(path)
            .await
            .map_err(|e| CacheError::io(path, "create temporary record", e))?;
        file.write_all(data)
            .await
            .map_err(|e| CacheError::io(path, "write temporary record", e))?;
        file.sync_all()
            .await
            .map_err(|e| CacheError::io(path, "sync temporary record", e))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<PersistedRecord>> {
        let path = self.record_path(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&path, "read record", e)),
        };

        let record: PersistedRecord = match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(key, path = %path.display(), error = %e, "corrupt record");
                return Err(CacheError::decode(key, &path, e));
            }
        };

        if record.key != key {
            return Err(CacheError::decode(
                key,
                &path,
                format!("record belongs to key '{}'", record.key),
            ));
        }

        Ok(Some(record))
    }

    async fn store(&self, record: &PersistedRecord) -> Result<()> {
        let path = self.record_path(&record.key);

        let data = serde_json::to_vec(record).map_err(|e| CacheError::encode(&path, e))?;

        let temp_path = self.temp_path();
        if let Err(e) = Self::write_file(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::io(&path, "rename record into place", e));
        }

        debug!(key = %record.key, bytes = data.len(), "record written");
        Ok(())
    }
}
