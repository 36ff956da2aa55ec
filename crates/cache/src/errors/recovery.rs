//! Recovery and classification utilities for cache errors

use super::types::{CacheError, ErrorCode, RecoveryHint};

impl CacheError {
    /// Get the recovery hint for this error
    #[must_use]
    pub const fn recovery_hint(&self) -> &RecoveryHint {
        match self {
            Self::PreconditionFailed { recovery_hint, .. }
            | Self::Decode { recovery_hint, .. }
            | Self::Io { recovery_hint, .. }
            | Self::NotADirectory { recovery_hint, .. }
            | Self::InvalidKey { recovery_hint, .. }
            | Self::Timeout { recovery_hint, .. }
            | Self::Unavailable { recovery_hint, .. }
            | Self::Configuration { recovery_hint, .. } => recovery_hint,
        }
    }

    /// Check if this error is transient and can be retried as-is
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.recovery_hint(), RecoveryHint::Retry { .. })
    }

    /// Check if this error indicates a corrupt persisted record
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Wire classification of this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PreconditionFailed { .. } => ErrorCode::PreconditionFailed,
            Self::Decode { .. } => ErrorCode::DecodeError,
            Self::Io { .. } | Self::NotADirectory { .. } => ErrorCode::IoError,
            Self::InvalidKey { .. } => ErrorCode::InvalidKey,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Unavailable { .. } => ErrorCode::Unavailable,
            Self::Configuration { .. } => ErrorCode::InternalError,
        }
    }
}
