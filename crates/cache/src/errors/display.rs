//! Display implementations for cache errors

use super::types::CacheError;
use std::fmt;

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreconditionFailed { key, .. } => {
                write!(f, "Precondition failed for key '{key}': current value does not match")
            }
            Self::Decode {
                key, path, source, ..
            } => write!(
                f,
                "Failed to decode record for key '{key}' at '{}': {source}",
                path.display()
            ),
            Self::Io {
                path,
                operation,
                source,
                ..
            } => write!(
                f,
                "I/O error during {} on '{}': {}",
                operation,
                path.display(),
                source
            ),
            Self::NotADirectory { path, .. } => {
                write!(f, "Storage root '{}' exists but is not a directory", path.display())
            }
            Self::InvalidKey { key, reason, .. } => {
                write!(f, "Invalid cache key '{key}': {reason}")
            }
            Self::Timeout {
                operation,
                duration,
                ..
            } => write!(f, "Timeout during {operation} after {duration:?}"),
            Self::Unavailable { reason, .. } => write!(f, "Cache unavailable: {reason}"),
            Self::Configuration { message, .. } => {
                write!(f, "Cache configuration error: {message}")
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
