//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセス（永続化ゲートウェイ）のインター
//! フェースを定義します。具体的な実装は Infrastructure 層が提供します
//! （依存性の逆転）。
//!
//! ## 依存性の逆転（DIP）
//!
//! - ドメイン層が必要とするインターフェースをドメイン層自身が定義
//! - Infrastructure 層がドメイン層のインターフェースに依存
//! - ドメイン層は Infrastructure 層に依存しない

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::{Message, MessageKind, User};
use super::error::RepositoryError;
use super::value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, UserId, Username,
};

/// 新規メッセージの作成パラメータ
///
/// `room` と `recipient_id` はどちらか一方だけを設定する。
/// `created_at` は永続化側が採番する（追記順 = 作成時刻順）。
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub sender_name: Username,
    pub content: MessageContent,
    pub room: Option<RoomId>,
    pub recipient_id: Option<UserId>,
    pub kind: MessageKind,
    pub file_url: Option<String>,
}

/// User Repository trait
///
/// ユーザー名の一意性はこの trait の実装側が保証する。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザー名に対応する User を取得し、存在しなければ作成する
    async fn find_or_create(&self, username: &Username) -> Result<User, RepositoryError>;

    /// ユーザーをオンラインにし、アクティブな接続を記録する
    async fn set_online(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Result<User, RepositoryError>;

    /// 接続 ID からユーザーをオフラインにし、last_seen を記録する
    ///
    /// その接続に対応するユーザーがいなければ None。
    async fn set_offline(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<User>, RepositoryError>;

    /// オンラインの全ユーザーを取得
    async fn list_online(&self) -> Result<Vec<User>, RepositoryError>;

    /// ID からユーザーを取得
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError>;
}

/// Message Repository trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを永続化する
    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// ルーム内のメッセージを取得する（古い順で返す）
    async fn list_room(
        &self,
        room: &RoomId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// グローバルフィード（非プライベート）のメッセージを取得する（古い順で返す）
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Message>, RepositoryError>;

    /// リアクションを付与する（冪等）
    async fn add_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        reaction: &str,
    ) -> Result<Message, RepositoryError>;

    /// 既読を付与する（冪等）
    async fn mark_read(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
    ) -> Result<Message, RepositoryError>;
}
