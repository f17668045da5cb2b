//! UI 層（HTTP / WebSocket の受け口）

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
