//! Core error types for the cache

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for every cache and storage operation
#[derive(Debug)]
pub enum CacheError {
    /// A conditional put did not match the current value
    PreconditionFailed {
        key: String,
        recovery_hint: RecoveryHint,
    },

    /// A persisted record exists but cannot be decoded
    Decode {
        key: String,
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },

    /// I/O errors while reading or writing records
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// The storage root exists but is not a directory
    NotADirectory {
        path: PathBuf,
        recovery_hint: RecoveryHint,
    },

    /// Key cannot be used to name a record
    InvalidKey {
        key: String,
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// A caller gave up waiting for the arbitrator
    Timeout {
        operation: &'static str,
        duration: Duration,
        recovery_hint: RecoveryHint,
    },

    /// The arbitrator is not accepting commands
    Unavailable {
        reason: String,
        recovery_hint: RecoveryHint,
    },

    /// Configuration error
    Configuration {
        message: String,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Retry the operation after a delay
    Retry { after: Duration },

    /// Read the current value and retry the put against it
    RereadAndRetry,

    /// Remove the corrupt record and write the key again
    ClearAndRetry,

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Update configuration
    UpdateConfiguration,

    /// No automated recovery possible
    Manual { instructions: String },
}

/// Machine-readable error classification used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    /// Request path has no handler; distinct from a missing key
    UnknownRoute,
    PreconditionFailed,
    InvalidKey,
    BadRequest,
    DecodeError,
    IoError,
    Timeout,
    Unavailable,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::UnknownRoute => "unknown_route",
            Self::PreconditionFailed => "precondition_failed",
            Self::InvalidKey => "invalid_key",
            Self::BadRequest => "bad_request",
            Self::DecodeError => "decode_error",
            Self::IoError => "io_error",
            Self::Timeout => "timeout",
            Self::Unavailable => "unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
