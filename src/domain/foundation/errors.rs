//! Error taxonomy for debate operations.
//!
//! Every failure a turn can surface to a caller is one of these variants.
//! Port-level errors (`StoreError`, `GatewayError`) are mapped into this
//! taxonomy by the application layer; the HTTP adapter maps it onto
//! response statuses.

use thiserror::Error;

/// Errors surfaced by debate operations.
///
/// An unknown opponent id is deliberately absent: persona lookup falls
/// back to the default persona and never fails.
#[derive(Debug, Clone, Error)]
pub enum DebateError {
    /// Malformed request input.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The completion provider timed out, failed, or returned a payload
    /// that could not be used. The user's turn, if any, stays committed.
    #[error("completion provider failed: {message}")]
    Provider { message: String, retriable: bool },

    /// The session was reset while a completion was outstanding; the
    /// result was discarded and the caller should reload history.
    #[error("session was reset while the turn was in flight")]
    StaleSession,

    /// The conversation store could not be reached. Fatal for the
    /// request: continuing would corrupt sequence integrity.
    #[error("conversation store unavailable: {0}")]
    StorageUnavailable(String),
}

impl DebateError {
    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a provider error.
    pub fn provider(message: impl Into<String>, retriable: bool) -> Self {
        Self::Provider {
            message: message.into(),
            retriable,
        }
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            DebateError::Provider { retriable: true, .. } | DebateError::StorageUnavailable(_)
        )
    }
}
