//! HTTP middleware.

mod session;

pub use session::{session_cookie, session_middleware, CurrentSession, SESSION_COOKIE};
