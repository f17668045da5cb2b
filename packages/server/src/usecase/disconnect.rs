//! UseCase: 切断処理（transport 駆動の disconnect）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - 切断後のクリーンアップ（入力中・ルーム参加・束縛・オンライン状態）
//!
//! ### なぜこのテストが必要か
//! - 切断後にその接続の痕跡（入力中エントリ・ルームメンバーシップ・
//!   オンライン表示）が残らないことを保証
//! - ゲートウェイ障害時でもインメモリのクリーンアップが完了することを確認
//! - 未参加の接続の切断が no-op であることを保証（冪等性）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加済みユーザーの切断
//! - エッジケース：user_join 前の切断、入力中のままの切断
//! - 異常系：set_offline の失敗

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    BoundUser, ConnectionId, ConnectionRegistry, RoomId, RoomTable, TypingEntry, TypingRoster,
    User, UserRepository,
};

use super::connections_for;

/// 切断処理の結果
#[derive(Debug, Clone)]
pub struct DisconnectOutcome {
    /// 切断したユーザー。user_join 前の接続だった場合は None
    pub user: Option<BoundUser>,
    /// 離脱したルームと、その残メンバーの接続（離脱通知の宛先）
    pub left_room: Option<(RoomId, Vec<ConnectionId>)>,
    /// 切断後のオンライン一覧。ゲートウェイ障害時は None（配信をスキップ）
    pub online_users: Option<Vec<User>>,
    /// 切断後の入力中スナップショット
    pub typing_entries: Vec<TypingEntry>,
}

/// 切断処理のユースケース
///
/// 切断はその接続の最後のイベントで、これ以降同じ接続のイベントは
/// 処理されない。インメモリのクリーンアップを先に完了させ、永続化の
/// 失敗はログに残すだけでクリーンアップを妨げない。
pub struct DisconnectUseCase {
    /// User Repository（永続化ゲートウェイ）
    users: Arc<dyn UserRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// ルームのメンバーシップ表
    rooms: Arc<Mutex<RoomTable>>,
    /// 入力中ロースター
    typing: Arc<Mutex<TypingRoster>>,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
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

    /// 切断処理を実行
    ///
    /// 未参加の接続の切断は no-op（user = None）。
    pub async fn execute(&self, connection_id: &ConnectionId) -> DisconnectOutcome {
        // 1. 入力中エントリの削除
        let typing_entries = {
            let mut typing = self.typing.lock().await;
            typing.clear(connection_id);
            typing.snapshot()
        };

        // 2. ルームからの離脱
        let left = {
            let mut rooms = self.rooms.lock().await;
            rooms.remove_connection(connection_id)
        };

        // 3. 束縛の解除（冪等）
        let user = {
            let mut registry = self.registry.lock().await;
            registry.unbind(connection_id)
        };

        let left_room = match left {
            Some((room, remaining)) => {
                let targets = connections_for(&self.registry, &remaining).await;
                Some((room, targets))
            }
            None => None,
        };

        // 4. 永続化。ここから先の失敗はクリーンアップを妨げない
        let online_users = if let Some(bound) = &user {
            if let Err(e) = self.users.set_offline(connection_id).await {
                tracing::warn!(
                    connection_id = %connection_id,
                    username = %bound.username,
                    error = %e,
                    "failed to mark user offline"
                );
            }

            match self.users.list_online().await {
                Ok(users) => Some(users),
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "failed to refresh online user list"
                    );
                    None
                }
            }
        } else {
            None
        };

        if let Some(bound) = &user {
            tracing::info!(
                connection_id = %connection_id,
                username = %bound.username,
                "user left the chat"
            );
        }

        DisconnectOutcome {
            user,
            left_room,
            online_users,
            typing_entries,
        }
    }
}
