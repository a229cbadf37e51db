//! Axum routes for debate endpoints.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::adapters::http::middleware::session_middleware;

use super::handlers::{
    establish_session, get_history, list_opponents, reset_session, submit_turn, DebateAppState,
};

/// Creates routes for debate endpoints.
///
/// - GET  /session   - establish the cookie session, return the anti-forgery token
/// - GET  /opponents - list personas (presentation data only)
/// - GET  /history   - current session transcript
/// - POST /turn      - submit one debate turn
/// - POST /reset     - invalidate the session and rotate its identity
pub fn debate_routes() -> Router<DebateAppState> {
    Router::new()
        .route("/session", get(establish_session))
        .route("/opponents", get(list_opponents))
        .route("/history", get(get_history))
        .route("/turn", post(submit_turn))
        .route("/reset", post(reset_session))
}

/// Combined router with all debate routes under /api, with the session
/// middleware installed.
pub fn api_router(state: DebateAppState) -> Router {
    Router::new()
        .nest("/api", debate_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debate_routes_creates_valid_router() {
        let _routes = debate_routes();
    }
}
