//! ユースケース層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, ValidationError};

/// イベント処理のエラー
///
/// どのエラーも発生元の接続にだけ `error` イベントとして通知される。
/// 他の接続の状態やプロセス全体には影響しない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// user_join を終えていない接続からのイベント
    #[error("not joined")]
    Unauthorized,

    /// ペイロードの検証エラー（副作用が起きる前に弾かれる）
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ValidationError),

    /// 対象のメッセージ・ユーザー・ルームが存在しない
    #[error("{0} not found")]
    NotFound(String),

    /// 永続化ゲートウェイのエラーまたはタイムアウト
    #[error("persistence failure: {0}")]
    Persistence(RepositoryError),
}

impl From<RepositoryError> for EventError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::UserNotFound(id) => EventError::NotFound(format!("user '{id}'")),
            RepositoryError::MessageNotFound(id) => {
                EventError::NotFound(format!("message '{id}'"))
            }
            e => EventError::Persistence(e),
        }
    }
}
