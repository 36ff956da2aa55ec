//! Error handling for the cache
//!
//! Every failure carries a recovery hint and maps to a wire-level
//! [`ErrorCode`] so callers can tell a precondition failure apart from a
//! transient fault.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
