//! Conversation domain - messages and the generation fence.
//!
//! A session's log is an ordered sequence of messages with store-assigned,
//! strictly increasing sequence numbers. Resetting a session does not
//! mutate the old log; it starts a new one under a bumped generation, and
//! the generation value is what fences appends from turns that were in
//! flight when the reset happened.

mod generation;
mod message;

pub use generation::Generation;
pub use message::{Message, Role};
