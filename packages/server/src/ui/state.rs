//! Server state and use case wiring.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionRegistry, MessagePusher, MessageRepository, RoomTable, TypingRoster, UserRepository,
};
use crate::usecase::{
    DisconnectUseCase, JoinChatUseCase, JoinRoomUseCase, LeaveRoomUseCase, MarkReadUseCase,
    ReactToMessageUseCase, SendMessageUseCase, SendPrivateMessageUseCase, SetTypingUseCase,
};

/// Shared application state
///
/// Holds one use case per inbound event plus the collaborators the HTTP API
/// reads directly. The coordination singletons (registry, room table, typing
/// roster) live inside the use cases and are created once per process.
pub struct AppState {
    /// MessagePusher（メッセージ通知の抽象化）
    pub pusher: Arc<dyn MessagePusher>,
    /// User Repository（HTTP API の読み取り用）
    pub users: Arc<dyn UserRepository>,
    /// Message Repository（HTTP API の読み取り用）
    pub messages: Arc<dyn MessageRepository>,
    /// アップロードされたファイルの保存先
    pub upload_dir: PathBuf,

    pub join_chat: Arc<JoinChatUseCase>,
    pub join_room: Arc<JoinRoomUseCase>,
    pub leave_room: Arc<LeaveRoomUseCase>,
    pub send_message: Arc<SendMessageUseCase>,
    pub send_private_message: Arc<SendPrivateMessageUseCase>,
    pub set_typing: Arc<SetTypingUseCase>,
    pub react_to_message: Arc<ReactToMessageUseCase>,
    pub mark_read: Arc<MarkReadUseCase>,
    pub disconnect: Arc<DisconnectUseCase>,
}

impl AppState {
    /// Wire the coordination state and use cases around the given
    /// repositories and pusher.
    pub fn new(
        users: Arc<dyn UserRepository>,
        messages: Arc<dyn MessageRepository>,
        pusher: Arc<dyn MessagePusher>,
        upload_dir: PathBuf,
    ) -> Self {
        // Process-wide coordination singletons, initialized empty at startup
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms = Arc::new(Mutex::new(RoomTable::new()));
        let typing = Arc::new(Mutex::new(TypingRoster::new()));

        Self {
            pusher,
            users: users.clone(),
            messages: messages.clone(),
            upload_dir,
            join_chat: Arc::new(JoinChatUseCase::new(
                users.clone(),
                registry.clone(),
                rooms.clone(),
                typing.clone(),
            )),
            join_room: Arc::new(JoinRoomUseCase::new(
                messages.clone(),
                registry.clone(),
                rooms.clone(),
            )),
            leave_room: Arc::new(LeaveRoomUseCase::new(registry.clone(), rooms.clone())),
            send_message: Arc::new(SendMessageUseCase::new(
                users.clone(),
                messages.clone(),
                registry.clone(),
                rooms.clone(),
            )),
            send_private_message: Arc::new(SendPrivateMessageUseCase::new(
                users.clone(),
                messages.clone(),
                registry.clone(),
            )),
            set_typing: Arc::new(SetTypingUseCase::new(registry.clone(), typing.clone())),
            react_to_message: Arc::new(ReactToMessageUseCase::new(
                messages.clone(),
                registry.clone(),
            )),
            mark_read: Arc::new(MarkReadUseCase::new(
                messages,
                registry.clone(),
                rooms.clone(),
            )),
            disconnect: Arc::new(DisconnectUseCase::new(users, registry, rooms, typing)),
        }
    }
}
