//! Inbound event dispatch (the event router).
//!
//! Single entry point for every event a connection sends: each arm resolves
//! the acting user through its use case, applies the domain mutation, and
//! fans the resulting events out to broadcast, room-scoped, or direct
//! targets. Failures are logged with the event name and connection id and
//! reported to the originating connection only, as an `error` event. They
//! never affect other connections or crash the router.

use crate::domain::{ConnectionId, MessagePusher as _};
use crate::infrastructure::dto::conversion::{kind_from_dto, reactions_to_dto};
use crate::infrastructure::dto::websocket::{
    ClientEvent, MessageDto, ServerEvent, TypingUserDto, UserDto,
};
use crate::usecase::EventError;
use crate::ui::state::AppState;

/// Dispatch one inbound event from a connection.
pub async fn dispatch_event(state: &AppState, connection_id: &ConnectionId, event: ClientEvent) {
    let event_name = event.name();

    let result = match event {
        ClientEvent::UserJoin { username } => {
            handle_user_join(state, connection_id, &username).await
        }
        ClientEvent::JoinRoom { room_id } => {
            handle_join_room(state, connection_id, &room_id).await
        }
        ClientEvent::LeaveRoom { room_id } => {
            handle_leave_room(state, connection_id, &room_id).await
        }
        ClientEvent::SendMessage {
            content,
            room,
            kind,
            file_url,
        } => {
            handle_send_message(
                state,
                connection_id,
                &content,
                room.as_deref(),
                kind.as_deref(),
                file_url,
            )
            .await
        }
        ClientEvent::SendPrivateMessage {
            recipient_id,
            content,
        } => handle_send_private_message(state, connection_id, &recipient_id, &content).await,
        ClientEvent::Typing { is_typing } => handle_typing(state, connection_id, is_typing).await,
        ClientEvent::MessageReaction {
            message_id,
            reaction,
        } => handle_message_reaction(state, connection_id, &message_id, &reaction).await,
        ClientEvent::MessageRead { message_id, room } => {
            handle_message_read(state, connection_id, &message_id, &room).await
        }
    };

    if let Err(e) = result {
        tracing::warn!(
            event = event_name,
            connection_id = %connection_id,
            error = %e,
            "event handling failed"
        );
        let error_event = ServerEvent::Error {
            message: client_error_message(&e),
        };
        if let Err(push_err) = state
            .pusher
            .push_to(connection_id, &error_event.encode())
            .await
        {
            tracing::debug!(
                connection_id = %connection_id,
                error = %push_err,
                "failed to deliver error event"
            );
        }
    }
}

/// Transport-driven disconnect: the final event for a connection.
///
/// Runs the cleanup use case, then re-broadcasts the refreshed online list
/// and typing snapshot so every remaining client converges.
pub async fn handle_disconnect(state: &AppState, connection_id: &ConnectionId) {
    let outcome = state.disconnect.execute(connection_id).await;

    let Some(user) = outcome.user else {
        // 束縛される前に切断した接続。通知するものはない
        return;
    };

    if let Some((room, targets)) = outcome.left_room {
        let event = ServerEvent::UserLeftRoom {
            username: user.username.as_str().to_string(),
            room: room.into_string(),
        };
        broadcast(state, targets, &event).await;
    }

    let event = ServerEvent::UserLeft {
        username: user.username.into_string(),
        id: user.user_id.into_string(),
    };
    broadcast_all(state, &event).await;

    if let Some(online_users) = outcome.online_users {
        let event = ServerEvent::UserList {
            users: online_users.into_iter().map(UserDto::from).collect(),
        };
        broadcast_all(state, &event).await;
    }

    let event = ServerEvent::TypingUsers {
        users: outcome
            .typing_entries
            .into_iter()
            .map(TypingUserDto::from)
            .collect(),
    };
    broadcast_all(state, &event).await;
}

async fn handle_user_join(
    state: &AppState,
    connection_id: &ConnectionId,
    username: &str,
) -> Result<(), EventError> {
    let outcome = state.join_chat.execute(connection_id, username).await?;

    let event = ServerEvent::UserList {
        users: outcome.online_users.into_iter().map(UserDto::from).collect(),
    };
    broadcast_all(state, &event).await;

    let event = ServerEvent::UserJoined {
        username: outcome.user.username.into_string(),
        id: outcome.user.id.into_string(),
    };
    broadcast_all(state, &event).await;

    Ok(())
}

async fn handle_join_room(
    state: &AppState,
    connection_id: &ConnectionId,
    room: &str,
) -> Result<(), EventError> {
    let outcome = state.join_room.execute(connection_id, room).await?;

    // 履歴は参加者本人にだけ送る
    let history = ServerEvent::RoomMessages {
        messages: outcome.history.into_iter().map(MessageDto::from).collect(),
    };
    push_to(state, connection_id, &history).await;

    // 自動離脱した前のルームの残メンバーへ
    if let Some((left_room, targets)) = outcome.auto_left {
        let event = ServerEvent::UserLeftRoom {
            username: outcome.user.username.as_str().to_string(),
            room: left_room.into_string(),
        };
        broadcast(state, targets, &event).await;
    }

    // 参加先の既存メンバーへ（参加者本人は含まれない）
    let event = ServerEvent::UserJoinedRoom {
        username: outcome.user.username.into_string(),
        room: outcome.room.into_string(),
    };
    broadcast(state, outcome.notify_joined, &event).await;

    Ok(())
}

async fn handle_leave_room(
    state: &AppState,
    connection_id: &ConnectionId,
    room: &str,
) -> Result<(), EventError> {
    let outcome = state.leave_room.execute(connection_id, room).await?;

    if let Some(targets) = outcome.notify_left {
        let event = ServerEvent::UserLeftRoom {
            username: outcome.user.username.into_string(),
            room: outcome.room.into_string(),
        };
        broadcast(state, targets, &event).await;
    }

    Ok(())
}

async fn handle_send_message(
    state: &AppState,
    connection_id: &ConnectionId,
    content: &str,
    room: Option<&str>,
    kind: Option<&str>,
    file_url: Option<String>,
) -> Result<(), EventError> {
    let outcome = state
        .send_message
        .execute(connection_id, content, room, kind_from_dto(kind), file_url)
        .await?;

    // 永続化が確定してからの配信（送信者自身も受信する）
    let event = ServerEvent::ReceiveMessage(MessageDto::from(outcome.message));
    broadcast(state, outcome.targets, &event).await;

    Ok(())
}

async fn handle_send_private_message(
    state: &AppState,
    connection_id: &ConnectionId,
    recipient_id: &str,
    content: &str,
) -> Result<(), EventError> {
    let outcome = state
        .send_private_message
        .execute(connection_id, recipient_id, content)
        .await?;

    let event = ServerEvent::ReceiveMessage(MessageDto::from(outcome.message));
    broadcast(state, outcome.targets, &event).await;

    Ok(())
}

async fn handle_typing(
    state: &AppState,
    connection_id: &ConnectionId,
    is_typing: bool,
) -> Result<(), EventError> {
    let outcome = state.set_typing.execute(connection_id, is_typing).await?;

    let event = ServerEvent::TypingUsers {
        users: outcome
            .entries
            .into_iter()
            .map(TypingUserDto::from)
            .collect(),
    };
    broadcast_all(state, &event).await;

    Ok(())
}

async fn handle_message_reaction(
    state: &AppState,
    connection_id: &ConnectionId,
    message_id: &str,
    reaction: &str,
) -> Result<(), EventError> {
    let outcome = state
        .react_to_message
        .execute(connection_id, message_id, reaction)
        .await?;

    let event = ServerEvent::MessageReaction {
        message_id: outcome.message.id.into_string(),
        reactions: reactions_to_dto(outcome.message.reactions),
    };
    broadcast_all(state, &event).await;

    Ok(())
}

async fn handle_message_read(
    state: &AppState,
    connection_id: &ConnectionId,
    message_id: &str,
    room: &str,
) -> Result<(), EventError> {
    let outcome = state
        .mark_read
        .execute(connection_id, message_id, room)
        .await?;

    let event = ServerEvent::MessageReadReceipt {
        message_id: outcome.message.id.into_string(),
        read_by: outcome
            .message
            .read_by
            .into_iter()
            .map(|id| id.into_string())
            .collect(),
    };
    broadcast(state, outcome.targets, &event).await;

    Ok(())
}

/// クライアントに返すエラーメッセージ
///
/// 永続化の失敗は内部事情を漏らさない汎用メッセージに落とす。
fn client_error_message(error: &EventError) -> String {
    match error {
        EventError::Persistence(_) => "something went wrong, please try again".to_string(),
        e => e.to_string(),
    }
}

async fn push_to(state: &AppState, connection_id: &ConnectionId, event: &ServerEvent) {
    if let Err(e) = state.pusher.push_to(connection_id, &event.encode()).await {
        tracing::debug!(connection_id = %connection_id, error = %e, "failed to push event");
    }
}

async fn broadcast(state: &AppState, targets: Vec<ConnectionId>, event: &ServerEvent) {
    if let Err(e) = state.pusher.broadcast(targets, &event.encode()).await {
        tracing::debug!(error = %e, "failed to broadcast event");
    }
}

async fn broadcast_all(state: &AppState, event: &ServerEvent) {
    if let Err(e) = state.pusher.broadcast_all(&event.encode()).await {
        tracing::debug!(error = %e, "failed to broadcast event");
    }
}
