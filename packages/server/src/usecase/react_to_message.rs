//! UseCase: メッセージリアクション処理（message_reaction）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Message, MessageId, MessageRepository, ValidationError,
};

use super::error::EventError;
use super::resolve_bound;

const REACTION_MAX_LEN: usize = 64;

/// リアクション付与の結果
#[derive(Debug, Clone)]
pub struct ReactToMessageOutcome {
    /// 更新後のメッセージ（reactions を全員にブロードキャストする）
    pub message: Message,
}

/// メッセージリアクションのユースケース
pub struct ReactToMessageUseCase {
    /// Message Repository（永続化ゲートウェイ）
    messages: Arc<dyn MessageRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
}

impl ReactToMessageUseCase {
    /// 新しい ReactToMessageUseCase を作成
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        registry: Arc<Mutex<ConnectionRegistry>>,
    ) -> Self {
        Self { messages, registry }
    }

    /// リアクション付与を実行（冪等）
    ///
    /// 同じ (メッセージ, ユーザー, 記号) の組を再適用しても結果は変わらない。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        message_id: &str,
        reaction: &str,
    ) -> Result<ReactToMessageOutcome, EventError> {
        let user = resolve_bound(&self.registry, connection_id).await?;
        let message_id = MessageId::new(message_id.to_string())?;

        let reaction = reaction.trim();
        if reaction.is_empty() {
            return Err(ValidationError::Empty("reaction").into());
        }
        if reaction.chars().count() > REACTION_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "reaction",
                max: REACTION_MAX_LEN,
            }
            .into());
        }

        let message = self
            .messages
            .add_reaction(&message_id, &user.user_id, reaction)
            .await?;

        Ok(ReactToMessageOutcome { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageContent, MessageKind, NewMessage, RoomId, RoomTable, TypingRoster, UserId, Username,
    };
    use crate::infrastructure::repository::{InMemoryMessageRepository, InMemoryUserRepository};
    use crate::usecase::JoinChatUseCase;

    struct Fixture {
        join_chat: JoinChatUseCase,
        react: ReactToMessageUseCase,
        messages: Arc<InMemoryMessageRepository>,
    }

    fn create_fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms = Arc::new(Mutex::new(RoomTable::new()));
        let typing = Arc::new(Mutex::new(TypingRoster::new()));
        Fixture {
            join_chat: JoinChatUseCase::new(users, registry.clone(), rooms, typing),
            react: ReactToMessageUseCase::new(messages.clone(), registry),
            messages,
        }
    }

    async fn create_message(fixture: &Fixture) -> Message {
        fixture
            .messages
            .create(NewMessage {
                sender_id: UserId::generate(),
                sender_name: Username::new("bob".to_string()).unwrap(),
                content: MessageContent::new("hello".to_string()).unwrap(),
                room: Some(RoomId::general()),
                recipient_id: None,
                kind: MessageKind::Text,
                file_url: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reaction_is_idempotent() {
        // テスト項目: 同じリアクションを 2 回適用しても結果は 1 回と同じ
        // given (前提条件): alice が参加中でメッセージが 1 件ある
        let fixture = create_fixture();
        let conn = ConnectionId::generate();
        let alice = fixture
            .join_chat
            .execute(&conn, "alice")
            .await
            .unwrap()
            .user;
        let message = create_message(&fixture).await;

        // when (操作): 同じリアクションを 2 回適用する
        fixture
            .react
            .execute(&conn, message.id.as_str(), "👍")
            .await
            .unwrap();
        let outcome = fixture
            .react
            .execute(&conn, message.id.as_str(), "👍")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.message.reactions.get("👍"), Some(&vec![alice.id]));
    }

    #[tokio::test]
    async fn test_reaction_unknown_message_is_not_found() {
        // テスト項目: 存在しないメッセージへのリアクションは NotFound になる
        // given (前提条件):
        let fixture = create_fixture();
        let conn = ConnectionId::generate();
        fixture.join_chat.execute(&conn, "alice").await.unwrap();

        // when (操作):
        let result = fixture.react.execute(&conn, "no-such-message", "👍").await;

        // then (期待する結果):
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reaction_empty_symbol_is_rejected() {
        // テスト項目: 空のリアクション記号は検証エラーになる
        // given (前提条件):
        let fixture = create_fixture();
        let conn = ConnectionId::generate();
        fixture.join_chat.execute(&conn, "alice").await.unwrap();
        let message = create_message(&fixture).await;

        // when (操作):
        let result = fixture.react.execute(&conn, message.id.as_str(), "  ").await;

        // then (期待する結果):
        assert!(matches!(result, Err(EventError::InvalidPayload(_))));
    }
}
