//! UseCase: 入力中インジケータ更新処理（typing）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, TypingEntry, TypingRoster};

use super::error::EventError;
use super::resolve_bound;

/// 入力中状態更新の結果
#[derive(Debug, Clone)]
pub struct SetTypingOutcome {
    /// 更新後のスナップショット（全員にブロードキャストされる）
    pub entries: Vec<TypingEntry>,
}

/// 入力中インジケータ更新のユースケース
///
/// 純粋なインメモリ操作で、永続化には触れない。
pub struct SetTypingUseCase {
    /// 接続 ↔ ユーザーの対応表
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// 入力中ロースター
    typing: Arc<Mutex<TypingRoster>>,
}

impl SetTypingUseCase {
    /// 新しい SetTypingUseCase を作成
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        typing: Arc<Mutex<TypingRoster>>,
    ) -> Self {
        Self { registry, typing }
    }

    /// 入力中状態の更新を実行
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        is_typing: bool,
    ) -> Result<SetTypingOutcome, EventError> {
        let user = resolve_bound(&self.registry, connection_id).await?;

        let entries = {
            let mut typing = self.typing.lock().await;
            typing.set(connection_id, user.user_id, user.username, is_typing)
        };

        Ok(SetTypingOutcome { entries })
    }
}
