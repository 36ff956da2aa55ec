//! Cache core for bcached
//!
//! This crate provides the part of the server that carries invariants:
//! - a single arbitration point per key (worker tasks owning the index)
//! - compare-and-swap puts with explicit preconditions
//! - write-through persistence of one JSON record per key
//! - hydration of cold keys from disk

pub mod arbitrator;
pub mod config;
pub mod entry;
pub mod errors;
pub mod keys;
pub mod storage;

pub use arbitrator::{CacheHandle, CacheStats, PutCondition};
pub use config::{ArbitratorConfig, EmptyExpectation};
pub use entry::PersistedRecord;
pub use errors::{CacheError, Error, ErrorCode, RecoveryHint, Result};
pub use keys::CacheKey;
pub use storage::{FileStore, RecordStore, RootStatus};
