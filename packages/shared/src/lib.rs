//! Shared utilities for the Idobata chat service.
//!
//! Cross-cutting concerns used by the server binary and the test harness:
//! logging setup and time handling.

pub mod logger;
pub mod time;
