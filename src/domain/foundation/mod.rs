//! Foundation - shared value objects and the error taxonomy.

mod errors;
mod ids;
mod timestamp;

pub use errors::DebateError;
pub use ids::{AntiForgeryToken, SessionToken};
pub use timestamp::Timestamp;
