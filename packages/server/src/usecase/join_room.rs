//! UseCase: ルーム参加処理（join_room）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - メンバーシップの更新（前のルームの自動離脱）、履歴取得、通知先の選定
//!
//! ### なぜこのテストが必要か
//! - ビジネスロジックの検証：1 接続につきアクティブルームは常に 1 つ以下
//! - 参加通知が参加者本人を除いたルームメンバーに届くことを保証
//! - メンバーシップの更新が履歴取得（await）より先に完了することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：初めてのルーム参加、別ルームへの移動
//! - 異常系：未参加（user_join 前）の接続、履歴取得の失敗
//! - エッジケース：同じルームへの再参加

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    BoundUser, ConnectionId, ConnectionRegistry, Message, MessageRepository, RoomId, RoomTable,
};

use super::error::EventError;
use super::{connections_for, resolve_bound};

/// 参加時に送るルーム履歴の最大件数
const ROOM_HISTORY_LIMIT: usize = 50;

/// ルーム参加の結果
#[derive(Debug, Clone)]
pub struct JoinRoomOutcome {
    /// 参加したユーザー
    pub user: BoundUser,
    /// 参加したルーム
    pub room: RoomId,
    /// 参加通知の宛先（参加前からのメンバーの接続、本人を含まない）
    pub notify_joined: Vec<ConnectionId>,
    /// 自動離脱した前のルームと、その残メンバーの接続（離脱通知の宛先）
    pub auto_left: Option<(RoomId, Vec<ConnectionId>)>,
    /// 参加したルームのメッセージ履歴（古い順）
    pub history: Vec<Message>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Message Repository（永続化ゲートウェイ）
    messages: Arc<dyn MessageRepository>,
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// ルームのメンバーシップ表
    rooms: Arc<Mutex<RoomTable>>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
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

    /// ルーム参加を実行
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room: &str,
    ) -> Result<JoinRoomOutcome, EventError> {
        let user = resolve_bound(&self.registry, connection_id).await?;
        let room = RoomId::new(room.to_string())?;

        // メンバーシップの更新はロック 1 回で完結させる。
        // 履歴取得（await）はその後
        let join = {
            let mut rooms = self.rooms.lock().await;
            rooms.join(connection_id.clone(), user.user_id.clone(), room.clone())
        };

        let notify_joined = connections_for(&self.registry, &join.prior_members).await;
        let auto_left = match join.auto_left {
            Some((left_room, remaining)) => {
                let targets = connections_for(&self.registry, &remaining).await;
                Some((left_room, targets))
            }
            None => None,
        };

        let history = self
            .messages
            .list_room(&room, ROOM_HISTORY_LIMIT, 0)
            .await?;

        tracing::info!(
            connection_id = %connection_id,
            username = %user.username,
            room = %room,
            "user joined room"
        );

        Ok(JoinRoomOutcome {
            user,
            room,
            notify_joined,
            auto_left,
            history,
        })
    }
}
