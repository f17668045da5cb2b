//! ユースケース層
//!
//! 受信イベント 1 つにつき 1 ユースケース。Event Router
//! （`ui::handler::dispatch`）から呼び出され、ドメイン状態の更新と
//! 配信先（接続 ID）の決定までを行う。ワイヤへのシリアライズと実際の
//! 送信は UI 層の責務。

use std::collections::BTreeSet;

use tokio::sync::Mutex;

use crate::domain::{BoundUser, ConnectionId, ConnectionRegistry, UserId};

pub mod disconnect;
pub mod error;
pub mod join_chat;
pub mod join_room;
pub mod leave_room;
pub mod mark_read;
pub mod react_to_message;
pub mod send_message;
pub mod send_private_message;
pub mod set_typing;

pub use disconnect::{DisconnectOutcome, DisconnectUseCase};
pub use error::EventError;
pub use join_chat::{JoinChatOutcome, JoinChatUseCase};
pub use join_room::{JoinRoomOutcome, JoinRoomUseCase};
pub use leave_room::{LeaveRoomOutcome, LeaveRoomUseCase};
pub use mark_read::{MarkReadOutcome, MarkReadUseCase};
pub use react_to_message::{ReactToMessageOutcome, ReactToMessageUseCase};
pub use send_message::{SendMessageOutcome, SendMessageUseCase};
pub use send_private_message::{SendPrivateMessageOutcome, SendPrivateMessageUseCase};
pub use set_typing::{SetTypingOutcome, SetTypingUseCase};

/// 接続の操作ユーザーを解決する
///
/// user_join を終えていない接続からのイベントはここで弾かれ、
/// 一切の副作用を起こさない。
pub(crate) async fn resolve_bound(
    registry: &Mutex<ConnectionRegistry>,
    connection_id: &ConnectionId,
) -> Result<BoundUser, EventError> {
    registry
        .lock()
        .await
        .resolve(connection_id)
        .cloned()
        .ok_or(EventError::Unauthorized)
}

/// ユーザー集合をアクティブな接続の集合に解決する（配信先計算）
///
/// オフラインのユーザー（アクティブな接続がないユーザー）は黙って落とす。
pub(crate) async fn connections_for(
    registry: &Mutex<ConnectionRegistry>,
    user_ids: &BTreeSet<UserId>,
) -> Vec<ConnectionId> {
    let registry = registry.lock().await;
    user_ids
        .iter()
        .filter_map(|id| registry.connection_of(id).cloned())
        .collect()
}
