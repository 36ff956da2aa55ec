//! JSON shapes exchanged with clients

use bcached_cache::{CacheStats, ErrorCode};
use serde::{Deserialize, Serialize};

/// Request and response body of `/client/get` and `/client/put`
///
/// Field names are PascalCase; lowercase spellings are accepted on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPayload {
    #[serde(rename = "Key", alias = "key", default)]
    pub key: String,
    #[serde(rename = "Value", alias = "value", default)]
    pub value: String,
    /// Expected current value for a put; empty means "no value given"
    #[serde(rename = "FromValue", alias = "fromValue", alias = "from_value", default)]
    pub from_value: String,
    /// Put only if the key has never been written
    #[serde(
        rename = "IfAbsent",
        alias = "ifAbsent",
        alias = "if_absent",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub if_absent: bool,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsBody {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub shards: usize,
}
