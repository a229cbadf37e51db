//! Debate endpoints - routes, handlers, and DTOs.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::DebateAppState;
pub use routes::{api_router, debate_routes};
