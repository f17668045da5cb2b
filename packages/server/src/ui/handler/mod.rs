//! HTTP / WebSocket handlers.

pub mod dispatch;
pub mod http;
pub mod websocket;

pub use http::{health_check, list_messages, list_online_users, upload_file};
pub use websocket::websocket_handler;
