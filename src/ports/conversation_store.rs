//! Conversation store port.
//!
//! Holds the ordered message log for each active session identity. The
//! log is the only mutable shared resource in the system; every mutation
//! goes through `append`/`reset` and implementations serialize appends
//! per session so concurrent turns never interleave sequence assignment.
//!
//! # Fencing
//!
//! `append` carries the generation the caller observed when its turn
//! started. The store commits only if that generation is still current;
//! otherwise the session was reset mid-flight and the append fails with
//! `StaleGeneration`. The comparison and the commit are one atomic step.

use async_trait::async_trait;

use crate::domain::conversation::{Generation, Message, Role};
use crate::domain::foundation::SessionToken;

/// Repository port for per-session conversation logs.
///
/// Implementations must ensure:
/// - sequence numbers are assigned at append time, strictly increasing
///   and contiguous within a generation
/// - reads never create session state
/// - the generation fence is checked atomically with the append
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Returns the committed log in order; empty for unknown sessions.
    async fn history(&self, session: &SessionToken) -> Result<Vec<Message>, StoreError>;

    /// Returns the session's current generation (INITIAL before any
    /// write).
    async fn generation(&self, session: &SessionToken) -> Result<Generation, StoreError>;

    /// Appends a message, assigning the next sequence number.
    ///
    /// Creates the session lazily on first append.
    ///
    /// # Errors
    ///
    /// - `StaleGeneration` if `observed` no longer matches the current
    ///   generation (the session was reset while the caller worked)
    /// - `InvalidContent` if the content is blank
    /// - `Unavailable` if the backing store cannot be reached
    async fn append(
        &self,
        session: &SessionToken,
        role: Role,
        content: &str,
        observed: Generation,
    ) -> Result<Message, StoreError>;

    /// Clears the session's log and bumps its generation.
    ///
    /// Returns the new generation. The bump is the linearization point
    /// that fences any turn still in flight under the old generation.
    async fn reset(&self, session: &SessionToken) -> Result<Generation, StoreError>;
}

/// Conversation store failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing store cannot be reached. Never swallowed: continuing
    /// without the log would corrupt sequence integrity.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The append was fenced: the session was reset after the caller
    /// captured its generation.
    #[error("append fenced: observed generation {observed}, session is at {current}")]
    StaleGeneration { observed: u64, current: u64 },

    /// The message content failed validation.
    #[error("invalid message content: {0}")]
    InvalidContent(String),
}

impl StoreError {
    /// Returns true if the failure is the generation fence firing.
    pub fn is_stale(&self) -> bool {
        matches!(self, StoreError::StaleGeneration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ConversationStore) {}
    }

    #[test]
    fn stale_classification() {
        let stale = StoreError::StaleGeneration {
            observed: 0,
            current: 1,
        };
        assert!(stale.is_stale());
        assert!(!StoreError::Unavailable("down".into()).is_stale());
    }
}
