//! UseCase: ルームメッセージ送信処理（send_message）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージの永続化、配信先（ルームメンバーの接続）の選定
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：永続化が確定するまで配信しない
//! - 配信先が送信者を含むルームメンバーに限られることを保証
//! - ゲートウェイ障害が送信者へのエラーとしてだけ現れることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム指定あり・なし（デフォルトルーム）の送信
//! - 異常系：空の本文、永続化の失敗
//! - エッジケース：ルーム外のユーザーは配信先に含まれない

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Message, MessageContent, MessageKind, MessageRepository,
    NewMessage, RoomId, RoomTable, UserId, UserRepository,
};

use super::error::EventError;
use super::{connections_for, resolve_bound};

/// メッセージ送信の結果
#[derive(Debug, Clone)]
pub struct SendMessageOutcome {
    /// 永続化されたメッセージ
    pub message: Message,
    /// 配信先（送信者を含むルームメンバーの接続）
    pub targets: Vec<ConnectionId>,
}

/// ルームメッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// User Repository（オフラインメンバーの通知判定用）
    users: Arc<dyn UserRepository>,
    /// Message Repository（永続化ゲートウェイ）
    messages: Arc<dyn MessageRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// ルームのメンバーシップ表
    rooms: Arc<Mutex<RoomTable>>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        users: Arc<dyn UserRepository>,
        messages: Arc<dyn MessageRepository>,
        registry: Arc<Mutex<ConnectionRegistry>>,
        rooms: Arc<Mutex<RoomTable>>,
    ) -> Self {
        Self {
            users,
            messages,
            registry,
            rooms,
        }
    }

    /// メッセージ送信を実行
    ///
    /// ルーム指定がない場合はデフォルトルーム宛になる。永続化が成功して
    /// はじめて配信先が計算される（失敗した送信は成功したように見えない）。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        content: &str,
        room: Option<&str>,
        kind: MessageKind,
        file_url: Option<String>,
    ) -> Result<SendMessageOutcome, EventError> {
        let user = resolve_bound(&self.registry, connection_id).await?;
        let content = MessageContent::new(content.to_string())?;
        let room = match room {
            Some(room) => RoomId::new(room.to_string())?,
            None => RoomId::general(),
        };

        // 1. 永続化（ここで失敗したら何も配信されない）
        let message = self
            .messages
            .create(NewMessage {
                sender_id: user.user_id.clone(),
                sender_name: user.username.clone(),
                content,
                room: Some(room.clone()),
                recipient_id: None,
                kind,
                file_url,
            })
            .await?;

        // 2. 配信先はルームメンバーの接続（送信者自身の接続を含む）
        let members = self.rooms.lock().await.members_of(&room);
        let targets = connections_for(&self.registry, &members).await;

        // 3. オフラインメンバーへの通知はベストエフォート
        self.notify_offline_members(&room, &members).await;

        tracing::debug!(
            connection_id = %connection_id,
            room = %room,
            message_id = %message.id,
            targets = targets.len(),
            "room message persisted"
        );

        Ok(SendMessageOutcome { message, targets })
    }

    /// ルームのオフラインメンバーへの通知（ベストエフォート）
    ///
    /// 失敗しても送信自体は成功扱いのまま。実際のプッシュ通知配送は
    /// 外部コラボレータの仕事で、ここでは対象を記録するだけ。
    async fn notify_offline_members(&self, room: &RoomId, members: &BTreeSet<UserId>) {
        for user_id in members {
            match self.users.find_by_id(user_id).await {
                Ok(Some(user)) if !user.is_online => {
                    tracing::info!(
                        username = %user.username,
                        room = %room,
                        "queueing notification for offline room member"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        room = %room,
                        error = %e,
                        "failed to look up room member for notification"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessageRepository, RepositoryError, TypingRoster};
    use crate::infrastructure::repository::{InMemoryMessageRepository, InMemoryUserRepository};
    use crate::usecase::{JoinChatUseCase, JoinRoomUseCase};

    struct Fixture {
        join_chat: JoinChatUseCase,
        join_room: JoinRoomUseCase,
        send_message: SendMessageUseCase,
        messages: Arc<InMemoryMessageRepository>,
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
            send_message: SendMessageUseCase::new(users, messages.clone(), registry, rooms),
            messages,
        }
    }

    async fn join_and_enter(fixture: &Fixture, name: &str, room: &str) -> ConnectionId {
        let conn = ConnectionId::generate();
        fixture.join_chat.execute(&conn, name).await.unwrap();
        fixture.join_room.execute(&conn, room).await.unwrap();
        conn
    }

    #[tokio::test]
    async fn test_send_message_targets_room_members_only() {
        // テスト項目: 配信先が送信者を含むルームメンバーの接続に限られる
        // given (前提条件): alice と bob が general、carol が random に参加中
        let fixture = create_fixture();
        let alice_conn = join_and_enter(&fixture, "alice", "general").await;
        let bob_conn = join_and_enter(&fixture, "bob", "general").await;
        let carol_conn = join_and_enter(&fixture, "carol", "random").await;

        // when (操作): alice が general にメッセージを送信する
        let outcome = fixture
            .send_message
            .execute(&alice_conn, "hi", Some("general"), MessageKind::Text, None)
            .await
            .unwrap();

        // then (期待する結果): alice と bob が配信先、carol は含まれない
        assert!(outcome.targets.contains(&alice_conn));
        assert!(outcome.targets.contains(&bob_conn));
        assert!(!outcome.targets.contains(&carol_conn));
        assert_eq!(outcome.message.sender_name.as_str(), "alice");
        assert_eq!(outcome.message.room, Some(RoomId::general()));
        assert_eq!(outcome.message.recipient_id, None);
    }

    #[tokio::test]
    async fn test_send_message_defaults_to_general_room() {
        // テスト項目: ルーム指定なしの送信はデフォルトルーム宛になる
        // given (前提条件):
        let fixture = create_fixture();
        let conn = join_and_enter(&fixture, "alice", "general").await;

        // when (操作):
        let outcome = fixture
            .send_message
            .execute(&conn, "hello", None, MessageKind::Text, None)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.message.room, Some(RoomId::general()));
    }

    #[tokio::test]
    async fn test_send_message_persists_in_creation_order() {
        // テスト項目: 送信したメッセージが作成順で永続化される
        // given (前提条件):
        let fixture = create_fixture();
        let conn = join_and_enter(&fixture, "alice", "general").await;

        // when (操作): 3 件続けて送信する
        for text in ["first", "second", "third"] {
            fixture
                .send_message
                .execute(&conn, text, Some("general"), MessageKind::Text, None)
                .await
                .unwrap();
        }

        // then (期待する結果): 取得順 = 送信順
        let history = fixture
            .messages
            .list_room(&RoomId::general(), 50, 0)
            .await
            .unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_send_message_empty_content_is_rejected() {
        // テスト項目: 空の本文は検証エラーになり、何も永続化されない
        // given (前提条件):
        let fixture = create_fixture();
        let conn = join_and_enter(&fixture, "alice", "general").await;

        // when (操作):
        let result = fixture
            .send_message
            .execute(&conn, "  ", Some("general"), MessageKind::Text, None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(EventError::InvalidPayload(_))));
        let history = fixture
            .messages
            .list_room(&RoomId::general(), 50, 0)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_send_message_persistence_failure_returns_error() {
        // テスト項目: 永続化の失敗はエラーとして返り、配信先は計算されない
        // given (前提条件): create が常に失敗する Message Repository
        let users = Arc::new(InMemoryUserRepository::new());
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms = Arc::new(Mutex::new(RoomTable::new()));
        let typing = Arc::new(Mutex::new(TypingRoster::new()));
        let join_chat = JoinChatUseCase::new(
            users.clone(),
            registry.clone(),
            rooms.clone(),
            typing,
        );

        let mut mock = MockMessageRepository::new();
        mock.expect_create().returning(|_| {
            Err(RepositoryError::StoreUnavailable("timeout".to_string()))
        });
        let send_message =
            SendMessageUseCase::new(users, Arc::new(mock), registry, rooms.clone());

        let conn = ConnectionId::generate();
        join_chat.execute(&conn, "alice").await.unwrap();

        // when (操作):
        let result = send_message
            .execute(&conn, "hi", Some("general"), MessageKind::Text, None)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(EventError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_send_file_message_keeps_file_url() {
        // テスト項目: ファイルメッセージで種別と URL が保持される
        // given (前提条件):
        let fixture = create_fixture();
        let conn = join_and_enter(&fixture, "alice", "general").await;

        // when (操作):
        let outcome = fixture
            .send_message
            .execute(
                &conn,
                "report.pdf",
                Some("general"),
                MessageKind::File,
                Some("/uploads/abc-report.pdf".to_string()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.message.kind, MessageKind::File);
        assert_eq!(
            outcome.message.file_url.as_deref(),
            Some("/uploads/abc-report.pdf")
        );
    }
}
