//! Generation counter used to fence stale appends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic per-session counter, bumped on every reset.
///
/// A turn captures the generation before it starts work and presents it
/// again when committing; a mismatch means the session was reset while
/// the turn was outstanding and the commit must be rejected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// Generation of a session that has never been reset.
    pub const INITIAL: Generation = Generation(0);

    /// Creates a generation from a raw counter value.
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }

    /// The generation after one more reset.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_zero() {
        assert_eq!(Generation::INITIAL.value(), 0);
        assert_eq!(Generation::default(), Generation::INITIAL);
    }

    #[test]
    fn next_increments() {
        let gen = Generation::INITIAL.next().next();
        assert_eq!(gen.value(), 2);
        assert!(gen > Generation::INITIAL);
    }
}
