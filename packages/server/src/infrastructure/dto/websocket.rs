//! WebSocket ワイヤ DTO
//!
//! 受信・送信どちらも `{"event": "<名前>", "data": {...}}` のエンベロープを
//! 使う。ペイロードのフィールド名はクライアント互換の camelCase。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// クライアントから受信するイベント
///
/// `disconnect` はクライアントが送るものではなく、トランスポートの
/// 切断として UI 層が直接扱う。
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    UserJoin {
        username: String,
    },
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    SendMessage {
        content: String,
        #[serde(default)]
        room: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
        #[serde(default, rename = "fileUrl")]
        file_url: Option<String>,
    },
    SendPrivateMessage {
        #[serde(rename = "recipientId")]
        recipient_id: String,
        content: String,
    },
    Typing {
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
    MessageReaction {
        #[serde(rename = "messageId")]
        message_id: String,
        reaction: String,
    },
    MessageRead {
        #[serde(rename = "messageId")]
        message_id: String,
        room: String,
    },
}

impl ClientEvent {
    /// ログ・エラー文脈用のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::UserJoin { .. } => "user_join",
            ClientEvent::JoinRoom { .. } => "join_room",
            ClientEvent::LeaveRoom { .. } => "leave_room",
            ClientEvent::SendMessage { .. } => "send_message",
            ClientEvent::SendPrivateMessage { .. } => "send_private_message",
            ClientEvent::Typing { .. } => "typing",
            ClientEvent::MessageReaction { .. } => "message_reaction",
            ClientEvent::MessageRead { .. } => "message_read",
        }
    }
}

/// オンラインユーザーのワイヤ表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub is_online: bool,
    pub last_seen: i64,
}

/// メッセージのワイヤ表現（receive_message / room_messages / HTTP API 共通）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    /// 送信者の表示名
    pub sender: String,
    pub sender_id: String,
    /// 本文（ファイルメッセージではファイル名）
    pub message: String,
    pub timestamp: i64,
    pub reactions: BTreeMap<String, Vec<String>>,
    #[serde(rename = "type")]
    pub kind: String,
    pub file_url: Option<String>,
    pub room: Option<String>,
    pub read_by: Vec<String>,
}

/// 入力中ユーザーのワイヤ表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUserDto {
    pub user_id: String,
    pub username: String,
}

/// サーバから送信するイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    UserList {
        users: Vec<UserDto>,
    },
    UserJoined {
        username: String,
        id: String,
    },
    UserLeft {
        username: String,
        id: String,
    },
    UserJoinedRoom {
        username: String,
        room: String,
    },
    UserLeftRoom {
        username: String,
        room: String,
    },
    ReceiveMessage(MessageDto),
    RoomMessages {
        messages: Vec<MessageDto>,
    },
    TypingUsers {
        users: Vec<TypingUserDto>,
    },
    MessageReaction {
        #[serde(rename = "messageId")]
        message_id: String,
        reactions: BTreeMap<String, Vec<String>>,
    },
    MessageReadReceipt {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(rename = "readBy")]
        read_by: Vec<String>,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// JSON 文字列にエンコードする
    ///
    /// 送信イベントは常に直列化可能な構造なので失敗しない。
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("server events always serialize")
    }
}
