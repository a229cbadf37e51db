//! Completion gateway port.
//!
//! Wraps the single external call of the system: an ordered message list
//! in, one assistant message out. This is the only operation with real
//! network latency, so implementations must bound it with a timeout and
//! must not touch the conversation store.
//!
//! The gateway never retries. Failures carry a retriable classification
//! and the caller decides what to do with it (here: surface immediately
//! and leave retry to the user).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, Role};

/// Port for the external completion provider.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Requests one completion over the given prompt.
    ///
    /// The prompt is ordered: system message first, then the turns in
    /// chronological order.
    async fn complete(&self, prompt: &[PromptMessage]) -> Result<Completion, GatewayError>;
}

/// One entry of the provider prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who the entry is attributed to.
    pub role: PromptRole,
    /// Entry text.
    pub content: String,
}

impl PromptMessage {
    /// Creates a system entry.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    /// Creates an entry from a committed message.
    pub fn from_message(message: &Message) -> Self {
        Self {
            role: message.role().into(),
            content: message.content().to_string(),
        }
    }
}

/// Prompt roles. Unlike the stored log, prompts carry a system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
        }
    }
}

/// One assistant reply from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Reply text. Guaranteed non-empty by implementations.
    pub content: String,
    /// Model that produced the reply, as reported by the provider.
    pub model: String,
}

/// Completion provider failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The call exceeded the configured timeout.
    #[error("provider call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Transport-level failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    /// The response arrived but could not be used (unparseable body,
    /// missing or empty completion text).
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Returns true if retrying the same call may succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            GatewayError::Timeout { .. } | GatewayError::Network(_) => true,
            GatewayError::Provider { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Malformed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn CompletionGateway) {}
    }

    #[test]
    fn prompt_role_from_log_role() {
        assert_eq!(PromptRole::from(Role::User), PromptRole::User);
        assert_eq!(PromptRole::from(Role::Assistant), PromptRole::Assistant);
    }

    #[test]
    fn prompt_message_from_committed_message() {
        let msg = Message::new(Role::User, "こんにちは", 1).unwrap();
        let prompt = PromptMessage::from_message(&msg);
        assert_eq!(prompt.role, PromptRole::User);
        assert_eq!(prompt.content, "こんにちは");
    }

    #[test]
    fn retriable_classification() {
        assert!(GatewayError::Timeout { timeout_secs: 30 }.is_retriable());
        assert!(GatewayError::network("connection reset").is_retriable());
        assert!(GatewayError::Provider {
            status: 503,
            message: "overloaded".into()
        }
        .is_retriable());
        assert!(GatewayError::Provider {
            status: 429,
            message: "slow down".into()
        }
        .is_retriable());

        assert!(!GatewayError::Provider {
            status: 400,
            message: "bad request".into()
        }
        .is_retriable());
        assert!(!GatewayError::malformed("empty choices").is_retriable());
    }

    #[test]
    fn prompt_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PromptRole::System).unwrap(),
            "\"system\""
        );
    }
}
