//! ドメイン層の値オブジェクト
//!
//! 識別子と検証付き文字列型を定義します。不正な値はコンストラクタで弾き、
//! ドメイン層の内側では常に有効な値として扱います。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValidationError;

const USERNAME_MAX_LEN: usize = 32;
const ROOM_ID_MAX_LEN: usize = 64;
const MESSAGE_CONTENT_MAX_LEN: usize = 4096;

/// デフォルトルームの名前（常に存在する）
pub const DEFAULT_ROOM: &str = "general";

/// 1 つの WebSocket セッションを表す接続 ID
///
/// 接続のたびにサーバ側で新しい値を採番する。再接続は新しい ConnectionId になる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい接続 ID を採番
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty("connection id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 永続化されたユーザーの ID
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// 新しいユーザー ID を採番
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty("user id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 永続化されたメッセージの ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// 新しいメッセージ ID を採番
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty("message id"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ルーム名
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty("room"));
        }
        if trimmed.chars().count() > ROOM_ID_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "room",
                max: ROOM_ID_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// デフォルトルーム
    pub fn general() -> Self {
        Self(DEFAULT_ROOM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ユーザー名
///
/// ユーザー名は永続化側で一意。前後の空白は取り除いて保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty("username"));
        }
        if trimmed.chars().count() > USERNAME_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: USERNAME_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文
///
/// ファイルメッセージではファイル名がここに入る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty("message content"));
        }
        if value.chars().count() > MESSAGE_CONTENT_MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "message content",
                max: MESSAGE_CONTENT_MAX_LEN,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_generate_is_unique() {
        // テスト項目: 採番した接続 ID が重複しない
        // given (前提条件):

        // when (操作):
        let id1 = ConnectionId::generate();
        let id2 = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_username_rejects_empty() {
        // テスト項目: 空のユーザー名は検証エラーになる
        // given (前提条件):

        // when (操作):
        let result = Username::new("   ".to_string());

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::Empty("username")));
    }

    #[test]
    fn test_username_is_trimmed() {
        // テスト項目: ユーザー名の前後の空白が取り除かれる
        // given (前提条件):

        // when (操作):
        let username = Username::new("  alice  ".to_string()).unwrap();

        // then (期待する結果):
        assert_eq!(username.as_str(), "alice");
    }

    #[test]
    fn test_username_rejects_too_long() {
        // テスト項目: 長すぎるユーザー名は検証エラーになる
        // given (前提条件):
        let long_name = "a".repeat(USERNAME_MAX_LEN + 1);

        // when (操作):
        let result = Username::new(long_name);

        // then (期待する結果):
        assert!(matches!(result, Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn test_message_content_rejects_empty() {
        // テスト項目: 空のメッセージ本文は検証エラーになる
        // given (前提条件):

        // when (操作):
        let result = MessageContent::new(String::new());

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::Empty("message content")));
    }

    #[test]
    fn test_room_id_general_is_default_room() {
        // テスト項目: RoomId::general がデフォルトルーム名を返す
        // given (前提条件):

        // when (操作):
        let room = RoomId::general();

        // then (期待する結果):
        assert_eq!(room.as_str(), DEFAULT_ROOM);
    }

    #[test]
    fn test_room_id_rejects_empty() {
        // テスト項目: 空のルーム名は検証エラーになる
        // given (前提条件):

        // when (操作):
        let result = RoomId::new("  ".to_string());

        // then (期待する結果):
        assert_eq!(result, Err(ValidationError::Empty("room")));
    }
}
