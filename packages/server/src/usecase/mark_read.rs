//! UseCase: 既読処理（message_read）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Message, MessageId, MessageRepository, RoomId, RoomTable,
};

use super::error::EventError;
use super::{connections_for, resolve_bound};

/// 既読付与の結果
#[derive(Debug, Clone)]
pub struct MarkReadOutcome {
    /// 更新後のメッセージ
    pub message: Message,
    /// 既読レシートの配信先（ルームメンバーの接続）
    pub targets: Vec<ConnectionId>,
}

/// 既読処理のユースケース
pub struct MarkReadUseCase {
    /// Message Repository（永続化ゲートウェイ）
    messages: Arc<dyn MessageRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// ルームのメンバーシップ表
    rooms: Arc<Mutex<RoomTable>>,
}

impl MarkReadUseCase {
    /// 新しい MarkReadUseCase を作成
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        registry: Arc<Mutex<ConnectionRegistry>>,
        rooms: Arc<Mutex<RoomTable>>,
    ) -> Self {
        Self {
            messages,
            registry,
            rooms,
        }
    }

    /// 既読付与を実行（冪等）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        message_id: &str,
        room: &str,
    ) -> Result<MarkReadOutcome, EventError> {
        let user = resolve_bound(&self.registry, connection_id).await?;
        let message_id = MessageId::new(message_id.to_string())?;
        let room = RoomId::new(room.to_string())?;

        let message = self.messages.mark_read(&message_id, &user.user_id).await?;

        let members = self.rooms.lock().await.members_of(&room);
        let targets = connections_for(&self.registry, &members).await;

        Ok(MarkReadOutcome { message, targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageKind, TypingRoster};
    use crate::infrastructure::repository::{InMemoryMessageRepository, InMemoryUserRepository};
    use crate::usecase::{JoinChatUseCase, JoinRoomUseCase, SendMessageUseCase};

    struct Fixture {
        join_chat: JoinChatUseCase,
        join_room: JoinRoomUseCase,
        send_message: SendMessageUseCase,
        mark_read: MarkReadUseCase,
    }

    fn create_fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms = Arc::new(Mutex::new(RoomTable::new()));
        let typing = Arc::new(Mutex::new(TypingRoster::new()));
        Fixture {
            join_chat: JoinChatUseCase::new(
                users.clone(),
                registry.clone(),
                rooms.clone(),
                typing,
            ),
            join_room: JoinRoomUseCase::new(messages.clone(), registry.clone(), rooms.clone()),
            send_message: SendMessageUseCase::new(
                users,
                messages.clone(),
                registry.clone(),
                rooms.clone(),
            ),
            mark_read: MarkReadUseCase::new(messages, registry, rooms),
        }
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent_and_targets_room() {
        // テスト項目: 既読が冪等に付与され、レシートの宛先がルームメンバーになる
        // given (前提条件): alice と bob が general に参加中で、alice の送信が 1 件ある
        let fixture = create_fixture();
        let alice_conn = ConnectionId::generate();
        let bob_conn = ConnectionId::generate();
        fixture.join_chat.execute(&alice_conn, "alice").await.unwrap();
        let bob = fixture
            .join_chat
            .execute(&bob_conn, "bob")
            .await
            .unwrap()
            .user;
        fixture
            .join_room
            .execute(&alice_conn, "general")
            .await
            .unwrap();
        fixture.join_room.execute(&bob_conn, "general").await.unwrap();
        let sent = fixture
            .send_message
            .execute(&alice_conn, "hi", Some("general"), MessageKind::Text, None)
            .await
            .unwrap()
            .message;

        // when (操作): bob が 2 回既読を付ける
        fixture
            .mark_read
            .execute(&bob_conn, sent.id.as_str(), "general")
            .await
            .unwrap();
        let outcome = fixture
            .mark_read
            .execute(&bob_conn, sent.id.as_str(), "general")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.message.read_by, vec![bob.id]);
        assert!(outcome.targets.contains(&alice_conn));
        assert!(outcome.targets.contains(&bob_conn));
    }

    #[tokio::test]
    async fn test_mark_read_unknown_message_is_not_found() {
        // テスト項目: 存在しないメッセージの既読付与は NotFound になる
        // given (前提条件):
        let fixture = create_fixture();
        let conn = ConnectionId::generate();
        fixture.join_chat.execute(&conn, "alice").await.unwrap();

        // when (操作):
        let result = fixture
            .mark_read
            .execute(&conn, "no-such-message", "general")
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }
}
