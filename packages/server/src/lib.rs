//! Real-time chat coordination server.
//!
//! Tracks which connection belongs to which user and which room a connection
//! has joined, and routes inbound events to the right fan-out targets:
//! broadcast to everyone, room-scoped, or direct to a user. Persisted users
//! and messages live behind repository traits; presence, typing state and
//! room membership are process-local and rebuilt as clients reconnect.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
