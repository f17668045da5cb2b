//! Conversion logic between DTOs and domain entities.

use std::collections::BTreeMap;

use crate::domain::{Message, MessageKind, TypingEntry, User, UserId};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<User> for dto::UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_string(),
            username: user.username.into_string(),
            is_online: user.is_online,
            last_seen: user.last_seen.value(),
        }
    }
}

impl From<Message> for dto::MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.into_string(),
            sender: message.sender_name.into_string(),
            sender_id: message.sender_id.into_string(),
            message: message.content.into_string(),
            timestamp: message.created_at.value(),
            reactions: reactions_to_dto(message.reactions),
            kind: kind_to_dto(message.kind).to_string(),
            file_url: message.file_url,
            room: message.room.map(|room| room.into_string()),
            read_by: message.read_by.into_iter().map(UserId::into_string).collect(),
        }
    }
}

impl From<TypingEntry> for dto::TypingUserDto {
    fn from(entry: TypingEntry) -> Self {
        Self {
            user_id: entry.user_id.into_string(),
            username: entry.username.into_string(),
        }
    }
}

/// リアクションマップをワイヤ表現に変換
pub fn reactions_to_dto(
    reactions: BTreeMap<String, Vec<UserId>>,
) -> BTreeMap<String, Vec<String>> {
    reactions
        .into_iter()
        .map(|(symbol, users)| {
            (
                symbol,
                users.into_iter().map(UserId::into_string).collect(),
            )
        })
        .collect()
}

/// メッセージ種別のワイヤ表現
pub fn kind_to_dto(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Text => "text",
        MessageKind::File => "file",
    }
}

/// ワイヤ表現からメッセージ種別へ（未知の値は text 扱い）
pub fn kind_from_dto(kind: Option<&str>) -> MessageKind {
    match kind {
        Some("file") => MessageKind::File,
        _ => MessageKind::Text,
    }
}
