//! Session cookie middleware and extractor.
//!
//! Every request through the API gets a session identity: the middleware
//! reads the session cookie, asks the lifecycle to establish a handle,
//! and injects it into request extensions. When the request carried no
//! usable cookie, the freshly issued token is set on the response.
//!
//! ```text
//! Request → session_middleware → injects SessionHandle into extensions
//!                                      ↓
//!                              Handler → CurrentSession extractor
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::debate::DebateAppState;
use crate::application::SessionHandle;
use crate::domain::foundation::SessionToken;

/// Name of the session identity cookie.
pub const SESSION_COOKIE: &str = "debate_session";

/// Establishes the session identity for every request.
pub async fn session_middleware(
    State(state): State<DebateAppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = extract_session_token(request.headers());
    let handle = state.lifecycle.establish(presented).await;
    let issued_new = presented != Some(handle.token);

    request.extensions_mut().insert(handle);
    let mut response = next.run(request).await;

    if issued_new {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(&handle.token)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

/// Renders the session cookie for a token.
pub fn session_cookie(token: &SessionToken) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

fn extract_session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.parse().ok())?
        })
}

/// Extractor for the session handle injected by `session_middleware`.
pub struct CurrentSession(pub SessionHandle);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .copied()
            .map(CurrentSession)
            .ok_or_else(|| {
                tracing::error!("session middleware is not installed on this route");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "code": "INTERNAL_ERROR",
                        "error": "session unavailable"
                    })),
                )
                    .into_response()
            })
    }
}
