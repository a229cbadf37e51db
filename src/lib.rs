//! Debate Arena - Multi-turn debates against scripted AI personas
//!
//! This crate implements the conversation-orchestration service behind a
//! browser debate chat: per-session message history, persona prompt
//! composition, and the request cycle against an external completion
//! provider.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
