//! UseCase: チャット参加処理（user_join）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinChatUseCase::execute() メソッド
//! - ユーザーの取得/作成、オンライン化、接続の束縛
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：永続化が成功してから接続を束縛する
//! - 再接続（同じユーザーの別接続）が古いセッションを置き換えることを保証
//! - ゲートウェイ障害時にインメモリ状態が汚れないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ユーザーの参加、既存ユーザーの再参加
//! - 異常系：不正なユーザー名、ゲートウェイ障害
//! - エッジケース：参加済みユーザーの別接続からの参加（最後の bind が勝つ）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, RoomTable, TypingRoster, User, UserRepository, Username,
};

use super::error::EventError;

/// チャット参加の結果
#[derive(Debug, Clone)]
pub struct JoinChatOutcome {
    /// 参加した（または再接続した）ユーザー
    pub user: User,
    /// 参加後のオンラインユーザー一覧（ゲートウェイが正）
    pub online_users: Vec<User>,
}

/// チャット参加のユースケース
pub struct JoinChatUseCase {
    /// User Repository（永続化ゲートウェイ）
    users: Arc<dyn UserRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// ルームのメンバーシップ表（置き換えた古い接続の掃除用）
    rooms: Arc<Mutex<RoomTable>>,
    /// 入力中ロースター（置き換えた古い接続の掃除用）
    typing: Arc<Mutex<TypingRoster>>,
}

impl JoinChatUseCase {
    /// 新しい JoinChatUseCase を作成
    pub fn new(
        users: Arc<dyn UserRepository>,
        registry: Arc<Mutex<ConnectionRegistry>>,
        rooms: Arc<Mutex<RoomTable>>,
        typing: Arc<Mutex<TypingRoster>>,
    ) -> Self {
        Self {
            users,
            registry,
            rooms,
            typing,
        }
    }

    /// チャット参加を実行
    ///
    /// 1. ユーザー名を検証し、User を取得または作成
    /// 2. オンラインにして接続を関連付け（永続化を先に完了させる）
    /// 3. 接続を束縛。同じユーザーの古い接続は置き換え、残留状態を掃除
    /// 4. オンライン一覧をゲートウェイから読み直す
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        username: &str,
    ) -> Result<JoinChatOutcome, EventError> {
        let username = Username::new(username.to_string())?;

        // 同じ接続からの 2 回目の user_join（ユーザー切り替え）を検出する
        let previous = {
            let registry = self.registry.lock().await;
            registry.resolve(connection_id).cloned()
        };

        // 永続化が失敗した場合、インメモリ状態は一切変化しない
        let user = self.users.find_or_create(&username).await?;

        // 前のユーザーとしての状態を先に退役させる
        if let Some(prev) = &previous {
            if prev.user_id != user.id {
                if let Err(e) = self.users.set_offline(connection_id).await {
                    tracing::warn!(
                        connection_id = %connection_id,
                        username = %prev.username,
                        error = %e,
                        "failed to retire previous identity"
                    );
                }
                self.rooms.lock().await.remove_connection(connection_id);
                self.typing.lock().await.clear(connection_id);
            }
        }

        let user = self.users.set_online(&user.id, connection_id).await?;

        // 束縛はロック 1 回で完了させる（await を挟まない）
        let displaced = {
            let mut registry = self.registry.lock().await;
            registry.bind(
                connection_id.clone(),
                user.id.clone(),
                user.username.clone(),
            )
        };

        // 置き換えられた古い接続の残留状態を掃除する
        if let Some(stale) = &displaced {
            self.rooms.lock().await.remove_connection(stale);
            self.typing.lock().await.clear(stale);
            tracing::debug!(
                connection_id = %connection_id,
                stale = %stale,
                "stale session displaced by rebind"
            );
        }

        let online_users = self.users.list_online().await?;

        tracing::info!(
            connection_id = %connection_id,
            username = %user.username,
            online = online_users.len(),
            "user joined the chat"
        );

        Ok(JoinChatOutcome { user, online_users })
    }
}
