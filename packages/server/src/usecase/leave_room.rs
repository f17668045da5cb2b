//! UseCase: ルーム離脱処理（leave_room）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{BoundUser, ConnectionId, ConnectionRegistry, RoomId, RoomTable};

use super::error::EventError;
use super::{connections_for, resolve_bound};

/// ルーム離脱の結果
#[derive(Debug, Clone)]
pub struct LeaveRoomOutcome {
    /// 離脱したユーザー
    pub user: BoundUser,
    /// 離脱したルーム
    pub room: RoomId,
    /// 離脱通知の宛先（残メンバーの接続）。メンバーでなかった場合は None
    pub notify_left: Option<Vec<ConnectionId>>,
}

/// ルーム離脱のユースケース
pub struct LeaveRoomUseCase {
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// ルームのメンバーシップ表
    rooms: Arc<Mutex<RoomTable>>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<Mutex<ConnectionRegistry>>, rooms: Arc<Mutex<RoomTable>>) -> Self {
        Self { registry, rooms }
    }

    /// ルーム離脱を実行
    ///
    /// メンバーでないルームの離脱は何もしない（冪等）。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room: &str,
    ) -> Result<LeaveRoomOutcome, EventError> {
        let user = resolve_bound(&self.registry, connection_id).await?;
        let room = RoomId::new(room.to_string())?;

        let remaining = {
            let mut rooms = self.rooms.lock().await;
            rooms.leave(connection_id, &user.user_id, &room)
        };

        let notify_left = match remaining {
            Some(remaining) => {
                tracing::info!(
                    connection_id = %connection_id,
                    username = %user.username,
                    room = %room,
                    "user left room"
                );
                Some(connections_for(&self.registry, &remaining).await)
            }
            None => None,
        };

        Ok(LeaveRoomOutcome {
            user,
            room,
            notify_left,
        })
    }
}
