//! Put preconditions

use bytes::Bytes;

/// Precondition evaluated against the current value before a put
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Always write
    Unconditional,
    /// Write only if the current value equals these bytes
    Expect(Bytes),
    /// Write only if the key has no value yet
    Absent,
}

impl PutCondition {
    /// Whether the current value has to be known to evaluate this condition
    pub fn needs_current(&self) -> bool {
        !matches!(self, Self::Unconditional)
    }

    pub fn matches(&self, current: Option<&[u8]>) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Expect(expected) => current == Some(expected.as_ref()),
            Self::Absent => current.is_none(),
        }
    }
}
