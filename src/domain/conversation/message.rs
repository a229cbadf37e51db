//! Message entity for the conversation log.
//!
//! Messages are immutable once committed. The sequence number is assigned
//! by the conversation store at append time, never by the caller.

use crate::domain::foundation::{DebateError, Timestamp};
use serde::{Deserialize, Serialize};

/// Sender of a committed message.
///
/// The system prompt never enters the log; it is composed per turn from
/// the persona catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The debating user.
    User,
    /// The persona's reply.
    Assistant,
}

/// A committed message within a session's log.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - `sequence` is strictly increasing and contiguous within one
///   session generation, starting at 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
    sequence: u64,
    created_at: Timestamp,
}

impl Message {
    /// Creates a message with a store-assigned sequence number.
    ///
    /// # Errors
    ///
    /// - `Validation` if content is empty or whitespace-only
    pub fn new(role: Role, content: impl Into<String>, sequence: u64) -> Result<Self, DebateError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DebateError::validation("content", "must not be blank"));
        }

        Ok(Self {
            role,
            content,
            sequence,
            created_at: Timestamp::now(),
        })
    }

    /// Returns the sender role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the store-assigned sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns when the message was committed.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message is from the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if this message is from the assistant persona.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_carries_role_content_and_sequence() {
        let msg = Message::new(Role::User, "Dogs are better than cats", 1).unwrap();
        assert!(msg.is_user());
        assert_eq!(msg.content(), "Dogs are better than cats");
        assert_eq!(msg.sequence(), 1);
    }

    #[test]
    fn rejects_empty_content() {
        assert!(Message::new(Role::User, "", 1).is_err());
        assert!(Message::new(Role::Assistant, "   \n", 1).is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn message_round_trips_through_json() {
        let msg = Message::new(Role::Assistant, "異議あり。", 3).unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
