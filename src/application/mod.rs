//! Application layer - use-case services over the ports.
//!
//! `DebateOrchestrator` drives one debate turn end to end;
//! `SessionLifecycle` owns the opaque session identity and its
//! anti-forgery pairing.

mod orchestrator;
mod session_lifecycle;

pub use orchestrator::DebateOrchestrator;
pub use session_lifecycle::{SessionHandle, SessionLifecycle};
