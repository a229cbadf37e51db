//! HTTP handlers for debate endpoints.
//!
//! These handlers connect axum routes to the application services. Error
//! mapping lives here: every `DebateError` variant surfaces as a
//! distinct status so the client can tell a provider failure from a
//! stale session or an unavailable store.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::middleware::{session_cookie, CurrentSession};
use crate::application::{DebateOrchestrator, SessionHandle, SessionLifecycle};
use crate::domain::foundation::{AntiForgeryToken, DebateError};
use crate::domain::persona::PersonaCatalog;

use super::dto::{
    ErrorResponse, HistoryQuery, HistoryResponse, MessageView, OpponentView, OpponentsResponse,
    ResetResponse, SessionResponse, TurnRequest, TurnResponse,
};

/// Header carrying the anti-forgery token on mutating requests.
pub const ANTI_FORGERY_HEADER: &str = "x-csrf-token";

// ════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════

/// Shared application state for debate handlers.
#[derive(Clone)]
pub struct DebateAppState {
    pub orchestrator: Arc<DebateOrchestrator>,
    pub lifecycle: Arc<SessionLifecycle>,
    pub catalog: Arc<PersonaCatalog>,
}

impl DebateAppState {
    /// Creates a new DebateAppState.
    pub fn new(
        orchestrator: Arc<DebateOrchestrator>,
        lifecycle: Arc<SessionLifecycle>,
        catalog: Arc<PersonaCatalog>,
    ) -> Self {
        Self {
            orchestrator,
            lifecycle,
            catalog,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GET /api/session
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/session - Establish the cookie session.
///
/// The middleware has already issued or recognized the identity; this
/// endpoint hands the client its anti-forgery token for later POSTs.
pub async fn establish_session(
    CurrentSession(session): CurrentSession,
) -> Result<impl IntoResponse, DebateApiError> {
    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            anti_forgery_token: session.anti_forgery.to_string(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// GET /api/opponents
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/opponents - List the opponent table.
///
/// Exposes only presentation data; system prompts stay server-side.
pub async fn list_opponents(
    State(state): State<DebateAppState>,
) -> Result<impl IntoResponse, DebateApiError> {
    let opponents = state.catalog.all().iter().map(OpponentView::from).collect();

    Ok((
        StatusCode::OK,
        Json(OpponentsResponse {
            opponents,
            default_id: state.catalog.default_id().to_string(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// GET /api/history
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/history - Current session's transcript.
///
/// Returns an empty list for a fresh session; reading never creates
/// server state.
pub async fn get_history(
    State(state): State<DebateAppState>,
    CurrentSession(session): CurrentSession,
    Query(_query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, DebateApiError> {
    let history = state.orchestrator.history(&session.token).await?;
    let history = history.iter().map(MessageView::from).collect();

    Ok((StatusCode::OK, Json(HistoryResponse { history })))
}

// ════════════════════════════════════════════════════════════════════════════
// POST /api/turn
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/turn - Submit one debate turn.
///
/// An empty `message` requests the persona's opening move. Unknown
/// opponent ids resolve to the default persona rather than failing.
///
/// # Errors
/// - 403 Forbidden: missing or mismatched anti-forgery token
/// - 409 Conflict: session was reset while the turn was in flight
/// - 502 Bad Gateway: completion provider failure
/// - 503 Service Unavailable: conversation store unreachable
pub async fn submit_turn(
    State(state): State<DebateAppState>,
    CurrentSession(session): CurrentSession,
    headers: HeaderMap,
    Json(request): Json<TurnRequest>,
) -> Result<impl IntoResponse, DebateApiError> {
    require_anti_forgery(&state, &session, &headers).await?;

    let message = state
        .orchestrator
        .handle_turn(&session.token, &request.opponent_id, &request.message)
        .await?;

    Ok((
        StatusCode::OK,
        Json(TurnResponse {
            response: MessageView::from(&message),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// POST /api/reset
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/reset - Invalidate the session and rotate its identity.
///
/// The response re-sets the session cookie to the new token and carries
/// the rotated anti-forgery token for the client's next request.
///
/// # Errors
/// - 403 Forbidden: missing or mismatched anti-forgery token
/// - 503 Service Unavailable: conversation store unreachable
pub async fn reset_session(
    State(state): State<DebateAppState>,
    CurrentSession(session): CurrentSession,
    headers: HeaderMap,
) -> Result<impl IntoResponse, DebateApiError> {
    require_anti_forgery(&state, &session, &headers).await?;

    let rotated = state.lifecycle.invalidate(&session.token).await?;

    Ok((
        StatusCode::OK,
        [(
            axum::http::header::SET_COOKIE,
            session_cookie(&rotated.token),
        )],
        Json(ResetResponse {
            message: "ディベートのセッションをリセットしました。".to_string(),
            anti_forgery_token: rotated.anti_forgery.to_string(),
        }),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Helper Functions
// ════════════════════════════════════════════════════════════════════════════

async fn require_anti_forgery(
    state: &DebateAppState,
    session: &SessionHandle,
    headers: &HeaderMap,
) -> Result<(), DebateApiError> {
    let presented: AntiForgeryToken = headers
        .get(ANTI_FORGERY_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| DebateApiError::Forbidden("Missing anti-forgery token".to_string()))?;

    if !state.lifecycle.verify(&session.token, &presented).await {
        return Err(DebateApiError::Forbidden(
            "Anti-forgery token mismatch".to_string(),
        ));
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// API error type that converts debate errors to HTTP responses.
#[derive(Debug)]
pub enum DebateApiError {
    Forbidden(String),
    Domain(DebateError),
}

impl From<DebateError> for DebateApiError {
    fn from(error: DebateError) -> Self {
        Self::Domain(error)
    }
}

impl IntoResponse for DebateApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            DebateApiError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("FORBIDDEN", message),
            ),
            DebateApiError::Domain(DebateError::Validation { field, reason }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("VALIDATION_FAILED", format!("{}: {}", field, reason)),
            ),
            DebateApiError::Domain(DebateError::Provider { message, retriable }) => {
                tracing::warn!(retriable, "provider failure surfaced to client: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("PROVIDER_ERROR", "The opponent failed to answer"),
                )
            }
            DebateApiError::Domain(DebateError::StaleSession) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("STALE_SESSION", "The session was reset; reload the debate"),
            ),
            DebateApiError::Domain(DebateError::StorageUnavailable(message)) => {
                tracing::error!("conversation store unavailable: {}", message);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("STORAGE_UNAVAILABLE", "Conversation storage is unavailable"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
