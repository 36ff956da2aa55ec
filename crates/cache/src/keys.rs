//! Cache key validation
//!
//! Each key names exactly one record file under the storage root, so a key
//! has to be a usable single path component on top of being non-empty.

use crate::errors::{CacheError, RecoveryHint, Result};

/// Maximum key length in bytes; `<key>.json` still fits a 255-byte file name
pub const MAX_KEY_LEN: usize = 250;

/// Trait for values usable as cache keys
pub trait CacheKey: AsRef<str> {
    /// Validate that this is a valid cache key
    fn validate(&self) -> Result<()> {
        let key = self.as_ref();

        if key.is_empty() {
            return Err(invalid(key, "Key cannot be empty", "Provide a non-empty key"));
        }

        if key.len() > MAX_KEY_LEN {
            let shown: String = key.chars().take(50).collect();
            return Err(invalid(
                &format!("{shown}..."),
                &format!("Key exceeds maximum length of {MAX_KEY_LEN} bytes"),
                "Use a shorter key",
            ));
        }

        if key == "." || key == ".." {
            return Err(invalid(
                key,
                "Key cannot be a relative path component",
                "Use a key other than '.' or '..'",
            ));
        }

        if key.contains('\0') {
            return Err(invalid(key, "Key contains null bytes", "Remove null bytes"));
        }

        if key.contains('/') || key.contains('\\') {
            return Err(invalid(
                key,
                "Key contains a path separator",
                "Remove '/' and '\\' from the key",
            ));
        }

        Ok(())
    }
}

impl CacheKey for str {}
impl CacheKey for String {}

fn invalid(key: &str, reason: &str, instructions: &str) -> CacheError {
    CacheError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
        recovery_hint: RecoveryHint::Manual {
            instructions: instructions.to_string(),
        },
    }
}
