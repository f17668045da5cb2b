//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! 追記専用の Vec をインメモリ DB として使用します。追記は単一のロックの
//! 下で行われるため、格納順がそのまま作成時刻順になります（同一ミリ秒に
//! 競合しても順序は崩れない）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use idobata_shared::time::get_utc_timestamp;

use crate::domain::{
    Message, MessageId, MessageRepository, NewMessage, RepositoryError, RoomId, Timestamp, UserId,
};

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    /// 追記順のメッセージログ
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for InMemoryMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// 新しい順で filter に合うものを limit/offset で切り出し、古い順で返す
fn page_oldest_first<F>(messages: &[Message], limit: usize, offset: usize, filter: F) -> Vec<Message>
where
    F: Fn(&Message) -> bool,
{
    let mut page: Vec<Message> = messages
        .iter()
        .rev()
        .filter(|m| filter(m))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    page.reverse();
    page
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;

        let message = Message {
            id: MessageId::generate(),
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            content: message.content,
            room: message.room,
            recipient_id: message.recipient_id,
            kind: message.kind,
            file_url: message.file_url,
            created_at: Timestamp::new(get_utc_timestamp()),
            reactions: Default::default(),
            read_by: Vec::new(),
        };
        messages.push(message.clone());

        Ok(message)
    }

    async fn list_room(
        &self,
        room: &RoomId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(page_oldest_first(&messages, limit, offset, |m| {
            m.room.as_ref() == Some(room)
        }))
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(page_oldest_first(&messages, limit, offset, |m| {
            m.recipient_id.is_none()
        }))
    }

    async fn add_reaction(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
        reaction: &str,
    ) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;

        let message = messages
            .iter_mut()
            .find(|m| m.id == *message_id)
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.as_str().to_string()))?;
        message.add_reaction(user_id.clone(), reaction);

        Ok(message.clone())
    }

    async fn mark_read(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
    ) -> Result<Message, RepositoryError> {
        let mut messages = self.messages.lock().await;

        let message = messages
            .iter_mut()
            .find(|m| m.id == *message_id)
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.as_str().to_string()))?;
        message.mark_read(user_id.clone());

        Ok(message.clone())
    }
}
