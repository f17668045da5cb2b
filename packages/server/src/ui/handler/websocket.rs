//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::{ConnectionId, MessagePusher as _};
use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};
use crate::ui::state::AppState;

use super::dispatch::{dispatch_event, handle_disconnect};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This function handles the outbound message flow: events addressed to this
/// connection (via the MessagePusher channel) are written to its WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // The connection id is minted server-side; a reconnect gets a fresh one
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    // Create a channel for this client to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register_client(connection_id.clone(), tx).await;
    tracing::info!(connection_id = %connection_id, "client connected");

    // Spawn a task to forward pushed events to this client
    let mut send_task = pusher_loop(rx, sender);

    let conn = connection_id.clone();
    let state_clone = state.clone();

    // Events from a single connection are processed in receipt order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(connection_id = %conn, error = %e, "WebSocket error");
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => dispatch_event(&state_clone, &conn, event).await,
                    Err(e) => {
                        tracing::warn!(
                            connection_id = %conn,
                            error = %e,
                            "failed to parse client event"
                        );
                        let error_event = ServerEvent::Error {
                            message: "invalid event payload".to_string(),
                        };
                        let _ = state_clone
                            .pusher
                            .push_to(&conn, &error_event.encode())
                            .await;
                    }
                },
                Message::Ping(_) => {
                    tracing::debug!("received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!(connection_id = %conn, "client requested close");
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Disconnect is the final event for this connection: cleanup starts here
    // and no further event from the same connection id is processed
    handle_disconnect(&state, &connection_id).await;
    state.pusher.unregister_client(&connection_id).await;
    tracing::info!(connection_id = %connection_id, "client disconnected");
}
