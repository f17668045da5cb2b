//! Repository 実装
//!
//! ## 実装
//!
//! - `inmemory`: HashMap / Vec をインメモリ DB として使う実装
//! - 将来的に: PostgreSQL, MongoDB など

pub mod inmemory;

pub use inmemory::{InMemoryMessageRepository, InMemoryUserRepository};
