//! Persisted record format
//!
//! One record per key, stored as a self-describing JSON object:
//!
//! ```json
//! {"Key":"a","Value":"MQ==","LastWrite":"2024-05-01T10:00:00.123456789Z"}
//! ```
//!
//! `Value` is base64 so arbitrary bytes survive the text encoding.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File extension of persisted records
pub const RECORD_EXTENSION: &str = "json";

/// One cache entry as written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value", with = "base64_bytes")]
    pub value: Bytes,
    #[serde(rename = "LastWrite")]
    pub last_write: DateTime<Utc>,
}

impl PersistedRecord {
    /// Build a record stamped with the current time
    pub fn new(key: impl Into<String>, value: Bytes) -> Self {
        Self {
            key: key.into(),
            value,
            last_write: Utc::now(),
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        // A nil byte slice is written as JSON null by some encoders
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(Bytes::from)
                .map_err(serde::de::Error::custom),
            None => Ok(Bytes::new()),
        }
    }
}
