//! Storage adapter: one JSON record per key under a root directory
//!
//! - `<root>/<key>.json` holds the latest accepted value for `key`
//! - writes go to a temp file in the same directory and are renamed into place
//! - an absent record is `Ok(None)`, never an error

mod file_store;

pub use file_store::{FileStore, RootStatus};

use crate::entry::PersistedRecord;
use crate::errors::Result;
use async_trait::async_trait;

/// Durable home for persisted records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the record for `key`; `Ok(None)` when it was never written
    async fn load(&self, key: &str) -> Result<Option<PersistedRecord>>;

    /// Replace the record for `record.key`
    async fn store(&self, record: &PersistedRecord) -> Result<()>;
}
