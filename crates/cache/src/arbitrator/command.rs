//! Messages accepted by a worker

use super::condition::PutCondition;
use super::stats::CacheStats;
use crate::errors::Result;
use bytes::Bytes;
use tokio::sync::oneshot;

pub(super) enum Command {
    Request(Request),
    /// Stop accepting commands, finish the queued ones, then acknowledge
    Shutdown { done: oneshot::Sender<()> },
}

/// Work evaluated against a worker's index
pub(super) enum Request {
    Get {
        key: String,
        reply: oneshot::Sender<Result<Option<Bytes>>>,
    },
    Put {
        key: String,
        value: Bytes,
        condition: PutCondition,
        reply: oneshot::Sender<Result<()>>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
}

impl Request {
    pub(super) fn name(&self) -> &'static str {
        match self {
            Self::Get { .. } => "get",
            Self::Put { .. } => "put",
            Self::Stats { .. } => "stats",
        }
    }
}
