//! The task that owns one shard of the in-memory index

use super::command::{Command, Request};
use super::condition::PutCondition;
use super::stats::CacheStats;
use crate::entry::PersistedRecord;
use crate::errors::{CacheError, Result};
use crate::storage::RecordStore;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// Sole owner of its index; evaluates one command at a time in arrival order
pub(super) struct Worker {
    shard: usize,
    index: HashMap<String, Bytes>,
    store: Arc<dyn RecordStore>,
    stats: CacheStats,
}

impl Worker {
    pub(super) fn new(shard: usize, store: Arc<dyn RecordStore>) -> Self {
        Self {
            shard,
            index: HashMap::new(),
            store,
            stats: CacheStats::default(),
        }
    }

    pub(super) async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        debug!(shard = self.shard, "worker started");
        let mut stopping: Vec<oneshot::Sender<()>> = Vec::new();

        // After close() the queued commands are still delivered, then None
        while let Some(command) = rx.recv().await {
            match command {
                Command::Shutdown { done } => {
                    rx.close();
                    stopping.push(done);
                }
                Command::Request(request) => self.handle(request).await,
            }
        }

        debug!(
            shard = self.shard,
            resident = self.index.len(),
            "worker stopped"
        );
        for done in stopping {
            let _ = done.send(());
        }
    }

    async fn handle(&mut self, request: Request) {
        trace!(shard = self.shard, request = request.name(), "processing");
        match request {
            Request::Get { key, reply } => {
                let result = self.get(&key).await;
                let _ = reply.send(result);
            }
            Request::Put {
                key,
                value,
                condition,
                reply,
            } => {
                // The write is applied even if the caller stopped waiting
                let result = self.put(key, value, condition).await;
                let _ = reply.send(result);
            }
            Request::Stats { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    async fn get(&mut self, key: &str) -> Result<Option<Bytes>> {
        if let Some(value) = self.index.get(key) {
            self.stats.hits += 1;
            debug!(shard = self.shard, key, "get hit");
            return Ok(Some(value.clone()));
        }

        self.stats.misses += 1;
        self.hydrate(key).await
    }

    /// Load `key` from disk into the index
    async fn hydrate(&mut self, key: &str) -> Result<Option<Bytes>> {
        match self.store.load(key).await {
            Ok(Some(record)) => {
                debug!(shard = self.shard, key, "hydrated from disk");
                self.stats.hydrations += 1;
                self.index.insert(key.to_string(), record.value.clone());
                Ok(Some(record.value))
            }
            Ok(None) => {
                debug!(shard = self.shard, key, "not found");
                Ok(None)
            }
            Err(e) => {
                warn!(shard = self.shard, key, error = %e, "hydration failed");
                self.stats.errors += 1;
                Err(e)
            }
        }
    }

    async fn put(&mut self, key: String, value: Bytes, condition: PutCondition) -> Result<()> {
        if condition.needs_current() && !self.index.contains_key(&key) {
            self.hydrate(&key).await?;
        }

        let current = self.index.get(&key).map(|v| v.as_ref());
        if !condition.matches(current) {
            self.stats.precondition_failures += 1;
            debug!(shard = self.shard, key = %key, "precondition failed");
            return Err(CacheError::precondition_failed(&key));
        }

        // Disk first: memory only ever holds values that reached the store
        let record = PersistedRecord::new(key, value);
        if let Err(e) = self.store.store(&record).await {
            warn!(shard = self.shard, key = %record.key, error = %e, "write-through failed");
            self.stats.errors += 1;
            return Err(e);
        }

        debug!(shard = self.shard, key = %record.key, bytes = record.value.len(), "put committed");
        self.stats.writes += 1;
        self.index.insert(record.key, record.value);
        Ok(())
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            resident_entries: self.index.len() as u64,
            ..self.stats
        }
    }
}
