//! Caller-side handle to the arbitrator workers

use super::command::{Command, Request};
use super::condition::PutCondition;
use super::stats::CacheStats;
use super::worker::Worker;
use crate::config::ArbitratorConfig;
use crate::errors::{CacheError, Result};
use crate::keys::CacheKey;
use crate::storage::RecordStore;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use xxhash_rust::xxh3::xxh3_64;

/// Cloneable entry point to the cache
///
/// Every operation is queued to the worker that owns the key. Workers are
/// spawned on the current tokio runtime.
#[derive(Clone)]
pub struct CacheHandle {
    shards: Arc<[mpsc::Sender<Command>]>,
}

impl CacheHandle {
    /// Spawn the workers over `store`
    pub fn spawn(store: Arc<dyn RecordStore>, config: &ArbitratorConfig) -> Result<Self> {
        config.validate()?;

        let shards: Vec<_> = (0..config.shards)
            .map(|shard| {
                let (tx, rx) = mpsc::channel(config.queue_depth);
                let worker = Worker::new(shard, Arc::clone(&store));
                tokio::spawn(worker.run(rx));
                tx
            })
            .collect();

        info!(
            shards = config.shards,
            queue_depth = config.queue_depth,
            "cache arbitrator started"
        );
        Ok(Self {
            shards: shards.into(),
        })
    }

    /// Current value of `key`, hydrating from disk on a miss
    ///
    /// `Ok(None)` means the key was never written.
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        key.validate()?;
        let (reply, rx) = oneshot::channel();
        self.dispatch(
            key,
            Command::Request(Request::Get {
                key: key.to_string(),
                reply,
            }),
        )
        .await?;
        Self::await_reply(rx).await?
    }

    /// Write `value` if `condition` holds for the current value
    ///
    /// The record is on disk before the new value becomes visible; a failed
    /// write leaves the previous value in place.
    pub async fn put(
        &self,
        key: &str,
        value: impl Into<Bytes>,
        condition: PutCondition,
    ) -> Result<()> {
        key.validate()?;
        let (reply, rx) = oneshot::channel();
        self.dispatch(
            key,
            Command::Request(Request::Put {
                key: key.to_string(),
                value: value.into(),
                condition,
                reply,
            }),
        )
        .await?;
        Self::await_reply(rx).await?
    }

    /// Counters summed across all workers
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut total = CacheStats::default();
        for sender in self.shards.iter() {
            let (reply, rx) = oneshot::channel();
            Self::send(sender, Command::Request(Request::Stats { reply })).await?;
            total.merge(&Self::await_reply(rx).await?);
        }
        Ok(total)
    }

    /// Stop all workers after they finish their queued commands
    ///
    /// Later calls on any clone of this handle fail with `Unavailable`.
    pub async fn shutdown(&self) {
        let mut pending = Vec::with_capacity(self.shards.len());
        for sender in self.shards.iter() {
            let (done, rx) = oneshot::channel();
            if sender.send(Command::Shutdown { done }).await.is_ok() {
                pending.push(rx);
            }
        }
        for rx in pending {
            let _ = rx.await;
        }
        info!("cache arbitrator stopped");
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the worker that owns `key`
    pub fn shard_for(&self, key: &str) -> usize {
        if self.shards.len() == 1 {
            return 0;
        }
        (xxh3_64(key.as_bytes()) % self.shards.len() as u64) as usize
    }

    async fn dispatch(&self, key: &str, command: Command) -> Result<()> {
        Self::send(&self.shards[self.shard_for(key)], command).await
    }

    async fn send(sender: &mpsc::Sender<Command>, command: Command) -> Result<()> {
        match sender.send(command).await {
            Ok(()) => Ok(()),
            Err(_) => Err(CacheError::unavailable("cache is shut down")),
        }
    }

    async fn await_reply<T>(rx: oneshot::Receiver<T>) -> Result<T> {
        match rx.await {
            Ok(value) => Ok(value),
            Err(_) => Err(CacheError::unavailable("worker dropped the request")),
        }
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("shards", &self.shards.len())
            .finish()
    }
}
