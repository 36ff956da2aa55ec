//! Arbitrator configuration
use crate::arbitrator::PutCondition;
use crate::errors::{CacheError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a put with an empty expected value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyExpectation {
    /// Empty means "no precondition": the write always goes through
    #[default]
    Unconditional,
    /// Empty means "the key must not exist yet"
    RequireAbsent,
}

impl EmptyExpectation {
    /// Turn a caller's expected value into an explicit condition
    pub fn resolve(self, expected: Bytes) -> PutCondition {
        if !expected.is_empty() {
            return PutCondition::Expect(expected);
        }
        match self {
            Self::Unconditional => PutCondition::Unconditional,
            Self::RequireAbsent => PutCondition::Absent,
        }
    }
}

impl fmt::Display for EmptyExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconditional => write!(f, "unconditional"),
            Self::RequireAbsent => write!(f, "require-absent"),
        }
    }
}

impl FromStr for EmptyExpectation {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "unconditional" => Ok(Self::Unconditional),
            "require-absent" | "require_absent" | "absent" => Ok(Self::RequireAbsent),
            other => Err(CacheError::configuration(format!(
                "unknown empty expectation '{other}', expected 'unconditional' or 'require-absent'"
            ))),
        }
    }
}

/// Sizing of the arbitrator workers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitratorConfig {
    /// Number of workers; keys are spread across them by hash
    pub shards: usize,
    /// Commands each worker queues before callers wait for room
    pub queue_depth: usize,
}

impl Default for ArbitratorConfig {
    fn default() -> Self {
        Self {
            shards: 1,
            queue_depth: 1024,
        }
    }
}

impl ArbitratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(CacheError::configuration("shards must be at least 1"));
        }
        if self.queue_depth == 0 {
            return Err(CacheError::configuration("queue_depth must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty_expectation() {
        assert_eq!(
            EmptyExpectation::Unconditional.resolve(Bytes::new()),
            PutCondition::Unconditional
        );
        assert_eq!(
            EmptyExpectation::RequireAbsent.resolve(Bytes::new()),
            PutCondition::Absent
        );
        assert_eq!(
            EmptyExpectation::RequireAbsent.resolve(Bytes::from_static(b"1")),
            PutCondition::Expect(Bytes::from_static(b"1"))
        );
    }

    #[test]
    fn test_parse_empty_expectation() {
        assert_eq!(
            "require-absent".parse::<EmptyExpectation>().unwrap(),
            EmptyExpectation::RequireAbsent
        );
        assert_eq!(
            "Unconditional".parse::<EmptyExpectation>().unwrap(),
            EmptyExpectation::Unconditional
        );
        assert!("sometimes".parse::<EmptyExpectation>().is_err());
    }

    #[test]
    fn test_validate_config() {
        assert!(ArbitratorConfig::default().validate().is_ok());
        let zero_shards = ArbitratorConfig {
            shards: 0,
            ..Default::default()
        };
        assert!(zero_shards.validate().is_err());
    }
}
