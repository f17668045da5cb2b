//! UseCase: ダイレクトメッセージ送信処理（send_private_message）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Message, MessageContent, MessageKind, MessageRepository,
    NewMessage, UserId, UserRepository,
};

use super::error::EventError;
use super::resolve_bound;

/// ダイレクトメッセージ送信の結果
#[derive(Debug, Clone)]
pub struct SendPrivateMessageOutcome {
    /// 永続化されたメッセージ
    pub message: Message,
    /// 配信先（送信者と受信者の接続だけ。受信者がオフラインなら送信者のみ）
    pub targets: Vec<ConnectionId>,
}

/// ダイレクトメッセージ送信のユースケース
pub struct SendPrivateMessageUseCase {
    /// User Repository（受信者の存在確認用）
    users: Arc<dyn UserRepository>,
    /// Message Repository（永続化ゲートウェイ）
    messages: Arc<dyn MessageRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
}

impl SendPrivateMessageUseCase {
    /// 新しい SendPrivateMessageUseCase を作成
    pub fn new(
        users: Arc<dyn UserRepository>,
        messages: Arc<dyn MessageRepository>,
        registry: Arc<Mutex<ConnectionRegistry>>,
    ) -> Self {
        Self {
            users,
            messages,
            registry,
        }
    }

    /// ダイレクトメッセージ送信を実行
    ///
    /// `room` は設定せず `recipient_id` だけを設定して永続化する。
    /// 配信先は送信者と受信者の接続に限られる。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        recipient_id: &str,
        content: &str,
    ) -> Result<SendPrivateMessageOutcome, EventError> {
        let sender = resolve_bound(&self.registry, connection_id).await?;
        let content = MessageContent::new(content.to_string())?;
        let recipient_id = UserId::new(recipient_id.to_string())?;

        let recipient = self
            .users
            .find_by_id(&recipient_id)
            .await?
            .ok_or_else(|| EventError::NotFound(format!("user '{recipient_id}'")))?;

        let message = self
            .messages
            .create(NewMessage {
                sender_id: sender.user_id.clone(),
                sender_name: sender.username.clone(),
                content,
                room: None,
                recipient_id: Some(recipient.id.clone()),
                kind: MessageKind::Text,
                file_url: None,
            })
            .await?;

        // 送信者の接続と、受信者がオンラインならその接続
        let mut targets = vec![connection_id.clone()];
        {
            let registry = self.registry.lock().await;
            if let Some(conn) = registry.connection_of(&recipient.id) {
                if conn != connection_id {
                    targets.push(conn.clone());
                }
            }
        }

        tracing::debug!(
            connection_id = %connection_id,
            recipient = %recipient.username,
            message_id = %message.id,
            "private message persisted"
        );

        Ok(SendPrivateMessageOutcome { message, targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomTable, TypingRoster};
    use crate::infrastructure::repository::{InMemoryMessageRepository, InMemoryUserRepository};
    use crate::usecase::JoinChatUseCase;

    struct Fixture {
        join_chat: JoinChatUseCase,
        send_private: SendPrivateMessageUseCase,
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
                rooms,
                typing,
            ),
            send_private: SendPrivateMessageUseCase::new(users, messages, registry),
        }
    }

    #[tokio::test]
    async fn test_private_message_targets_sender_and_recipient_only() {
        // テスト項目: 配信先が送信者と受信者の接続だけになる
        // given (前提条件): alice, bob, carol が参加中
        let fixture = create_fixture();
        let alice_conn = ConnectionId::generate();
        let bob_conn = ConnectionId::generate();
        let carol_conn = ConnectionId::generate();
        fixture.join_chat.execute(&alice_conn, "alice").await.unwrap();
        let bob = fixture
            .join_chat
            .execute(&bob_conn, "bob")
            .await
            .unwrap()
            .user;
        fixture.join_chat.execute(&carol_conn, "carol").await.unwrap();

        // when (操作): alice が bob にダイレクトメッセージを送る
        let outcome = fixture
            .send_private
            .execute(&alice_conn, bob.id.as_str(), "hey")
            .await
            .unwrap();

        // then (期待する結果):
        assert!(outcome.targets.contains(&alice_conn));
        assert!(outcome.targets.contains(&bob_conn));
        assert!(!outcome.targets.contains(&carol_conn));
        assert_eq!(outcome.message.room, None);
        assert_eq!(outcome.message.recipient_id, Some(bob.id));
    }

    #[tokio::test]
    async fn test_private_message_offline_recipient_targets_sender_only() {
        // テスト項目: 受信者がオフラインでも永続化され、配信先は送信者だけになる
        // given (前提条件): bob は参加後に切断済み（束縛なし）
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
        // when (操作): bob の束縛が消えた状態で送信する
        // （切断処理は DisconnectUseCase のテストで扱う。ここでは直接 unbind）
        fixture.send_private.registry.lock().await.unbind(&bob_conn);
        let outcome = fixture
            .send_private
            .execute(&alice_conn, bob.id.as_str(), "hey")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.targets, vec![alice_conn]);
    }

    #[tokio::test]
    async fn test_private_message_unknown_recipient_is_not_found() {
        // テスト項目: 存在しない受信者への送信は NotFound になる
        // given (前提条件):
        let fixture = create_fixture();
        let alice_conn = ConnectionId::generate();
        fixture.join_chat.execute(&alice_conn, "alice").await.unwrap();

        // when (操作):
        let result = fixture
            .send_private
            .execute(&alice_conn, "no-such-user", "hey")
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_private_message_unbound_sender_is_rejected() {
        // テスト項目: user_join 前の接続からの送信は Unauthorized になる
        // given (前提条件):
        let fixture = create_fixture();

        // when (操作):
        let result = fixture
            .send_private
            .execute(&ConnectionId::generate(), "someone", "hey")
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), EventError::Unauthorized);
    }
}
