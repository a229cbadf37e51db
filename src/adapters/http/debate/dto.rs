//! HTTP DTOs for debate endpoints.
//!
//! These types decouple the HTTP API from domain types. Persona views
//! deliberately omit the system prompt: it never leaves the server.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, Role};
use crate::domain::persona::Persona;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of a turn submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    /// Opponent to debate. Unknown ids resolve to the default persona.
    pub opponent_id: String,
    /// The user's turn; empty requests the persona's opening move.
    #[serde(default)]
    pub message: String,
}

/// Query parameters for history retrieval.
///
/// `opponentId` is part of the endpoint contract but history is keyed by
/// session identity; the parameter does not alter the result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub opponent_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One transcript entry as the client renders it.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
        }
    }
}

/// Response to a turn submission.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub response: MessageView,
}

/// Response to a history request.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<MessageView>,
}

/// Response to a reset request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub message: String,
    pub anti_forgery_token: String,
}

/// Response to a session bootstrap request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub anti_forgery_token: String,
}

/// Presentation view of one opponent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentView {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: String,
}

impl From<&Persona> for OpponentView {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id().to_string(),
            display_name: persona.display_name().to_string(),
            avatar_ref: persona.avatar_ref().to_string(),
        }
    }
}

/// Response listing the opponent table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentsResponse {
    pub opponents: Vec<OpponentView>,
    pub default_id: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Error Response
// ════════════════════════════════════════════════════════════════════════════

/// Standard error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_request_accepts_missing_message() {
        let request: TurnRequest =
            serde_json::from_str(r#"{"opponentId": "matsuko"}"#).unwrap();
        assert_eq!(request.opponent_id, "matsuko");
        assert!(request.message.is_empty());
    }

    #[test]
    fn turn_request_uses_camel_case() {
        let request: TurnRequest =
            serde_json::from_str(r#"{"opponentId": "hiroyuki", "message": "どうも"}"#).unwrap();
        assert_eq!(request.message, "どうも");
    }

    #[test]
    fn message_view_serializes_per_contract() {
        let message = Message::new(Role::Assistant, "それは違う", 1).unwrap();
        let json = serde_json::to_value(TurnResponse {
            response: MessageView::from(&message),
        })
        .unwrap();

        assert_eq!(json["response"]["role"], "assistant");
        assert_eq!(json["response"]["content"], "それは違う");
    }

    #[test]
    fn opponent_view_never_carries_the_system_prompt() {
        let persona = Persona::new("x", "X", "/images/x.webp", "secret instructions");
        let json = serde_json::to_string(&OpponentView::from(&persona)).unwrap();
        assert!(!json.contains("secret instructions"));
        assert!(json.contains("avatarRef"));
    }

    #[test]
    fn reset_response_uses_camel_case_token_field() {
        let json = serde_json::to_value(ResetResponse {
            message: "reset".into(),
            anti_forgery_token: "token".into(),
        })
        .unwrap();
        assert!(json.get("antiForgeryToken").is_some());
    }
}
