//! メッセージ送信（通知）の trait 定義
//!
//! 接続中のクライアントへのメッセージ送信を抽象化する。UseCase 層は
//! この trait に依存し、WebSocket などの具体的な実装には依存しない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::ConnectionId;

/// クライアントへ送信するためのチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントを登録する
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントを登録解除する
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントへ送信する
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 指定したクライアント群へ送信する（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 登録済みの全クライアントへ送信する（一部の送信失敗は許容）
    async fn broadcast_all(&self, content: &str) -> Result<(), MessagePushError>;
}
