//! Constructors for the errors raised in more than one place

use super::types::{CacheError, RecoveryHint};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

impl CacheError {
    /// Wrap an I/O error with the path and operation it happened on
    pub fn io(path: &Path, operation: &'static str, source: std::io::Error) -> Self {
        let recovery_hint = match source.kind() {
            ErrorKind::PermissionDenied => RecoveryHint::CheckPermissions {
                path: path.to_path_buf(),
            },
            ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
                RecoveryHint::Retry {
                    after: Duration::from_millis(100),
                }
            }
            _ => RecoveryHint::Manual {
                instructions: format!("Inspect '{}' and the device behind it", path.display()),
            },
        };

        Self::Io {
            path: path.to_path_buf(),
            operation,
            source,
            recovery_hint,
        }
    }

    /// A record at `path` could not be decoded
    pub fn decode(
        key: &str,
        path: &Path,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            key: key.to_string(),
            path: path.to_path_buf(),
            source: source.into(),
            recovery_hint: RecoveryHint::ClearAndRetry,
        }
    }

    /// A record could not be serialized before writing it to `path`
    pub fn encode(path: &Path, source: serde_json::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            operation: "encode record",
            source: std::io::Error::new(ErrorKind::InvalidData, source),
            recovery_hint: RecoveryHint::Manual {
                instructions: "Report the value that failed to encode".to_string(),
            },
        }
    }

    pub fn precondition_failed(key: &str) -> Self {
        Self::PreconditionFailed {
            key: key.to_string(),
            recovery_hint: RecoveryHint::RereadAndRetry,
        }
    }

    /// The arbitrator's queue or reply channel is gone
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_millis(250),
            },
        }
    }

    pub fn timeout(operation: &'static str, duration: Duration) -> Self {
        Self::Timeout {
            operation,
            duration,
            recovery_hint: RecoveryHint::Retry {
                after: Duration::from_millis(100),
            },
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }
}
