//! Cache arbitration
//!
//! The in-memory index is owned by worker tasks. Callers never touch it;
//! they send commands through [`CacheHandle`] and await the reply. Each
//! worker evaluates its commands strictly one at a time in arrival order, so
//! hydration, precondition checks and write-through for a key never
//! interleave with another operation on the same key.

mod command;
mod condition;
mod handle;
mod stats;
mod worker;

pub use condition::PutCondition;
pub use handle::CacheHandle;
pub use stats::CacheStats;
