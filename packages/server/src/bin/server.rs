//! Real-time chat server over WebSocket.
//!
//! Clients join with a username, enter rooms, exchange text/file messages,
//! and see presence and typing indicators.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin idobata-server
//! cargo run --bin idobata-server -- --host 0.0.0.0 --port 5000
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use idobata_server::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryMessageRepository, InMemoryUserRepository},
    },
    ui::{AppState, Server},
};
use idobata_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "idobata-server")]
#[command(about = "Real-time chat server with rooms, presence and typing indicators", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "5000")]
    port: u16,

    /// Directory where uploaded files are stored
    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. AppState (coordination state + use cases)
    // 4. Server

    // 1. Create Repositories (in-memory database)
    let users = Arc::new(InMemoryUserRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create AppState
    let state = Arc::new(AppState::new(users, messages, pusher, args.upload_dir));

    // 4. Create and run the server
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
