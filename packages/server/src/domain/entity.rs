//! ドメイン層のエンティティ
//!
//! 永続化される User / Message と、それに付随する振る舞い
//! （リアクション付与・既読付与）を定義します。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value_object::{
    ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId, Username,
};

/// 永続化されるユーザー
///
/// `is_online` と `last_connection_id` だけがこのサービスから更新される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub is_online: bool,
    pub last_connection_id: Option<ConnectionId>,
    pub last_seen: Timestamp,
}

/// メッセージ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
}

/// 永続化されるメッセージ
///
/// `room` と `recipient_id` はどちらか一方だけが意味を持つ：
/// ルーム宛なら `room`、ダイレクトメッセージなら `recipient_id`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    /// 作成時点のユーザー名（非正規化）
    pub sender_name: Username,
    pub content: MessageContent,
    pub room: Option<RoomId>,
    pub recipient_id: Option<UserId>,
    pub kind: MessageKind,
    pub file_url: Option<String>,
    pub created_at: Timestamp,
    /// リアクション記号 → 付与したユーザー（記号ごとに重複なし）
    pub reactions: BTreeMap<String, Vec<UserId>>,
    pub read_by: Vec<UserId>,
}

impl Message {
    /// リアクションを付与する（冪等）
    ///
    /// 同じ (ユーザー, 記号) の組を再適用しても結果は変わらない。
    pub fn add_reaction(&mut self, user_id: UserId, reaction: &str) {
        let users = self.reactions.entry(reaction.to_string()).or_default();
        if !users.contains(&user_id) {
            users.push(user_id);
        }
    }

    /// 既読を付与する（冪等）
    pub fn mark_read(&mut self, user_id: UserId) {
        if !self.read_by.contains(&user_id) {
            self.read_by.push(user_id);
        }
    }
}

/// 入力中のユーザーを表すエントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingEntry {
    pub user_id: UserId,
    pub username: Username,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_message() -> Message {
        Message {
            id: MessageId::generate(),
            sender_id: UserId::generate(),
            sender_name: Username::new("alice".to_string()).unwrap(),
            content: MessageContent::new("Hello!".to_string()).unwrap(),
            room: Some(RoomId::general()),
            recipient_id: None,
            kind: MessageKind::Text,
            file_url: None,
            created_at: Timestamp::new(1000),
            reactions: BTreeMap::new(),
            read_by: Vec::new(),
        }
    }

    #[test]
    fn test_add_reaction_is_idempotent() {
        // テスト項目: 同じ (ユーザー, 記号) のリアクションを 2 回適用しても結果は 1 回と同じ
        // given (前提条件):
        let mut message = create_test_message();
        let user_id = UserId::generate();

        // when (操作):
        message.add_reaction(user_id.clone(), "👍");
        message.add_reaction(user_id.clone(), "👍");

        // then (期待する結果):
        assert_eq!(message.reactions.get("👍"), Some(&vec![user_id]));
    }

    #[test]
    fn test_add_reaction_multiple_users_same_symbol() {
        // テスト項目: 同じ記号に複数のユーザーがリアクションできる
        // given (前提条件):
        let mut message = create_test_message();
        let alice = UserId::generate();
        let bob = UserId::generate();

        // when (操作):
        message.add_reaction(alice.clone(), "🎉");
        message.add_reaction(bob.clone(), "🎉");

        // then (期待する結果):
        assert_eq!(message.reactions.get("🎉"), Some(&vec![alice, bob]));
    }

    #[test]
    fn test_add_reaction_different_symbols() {
        // テスト項目: 同じユーザーが異なる記号でリアクションできる
        // given (前提条件):
        let mut message = create_test_message();
        let user_id = UserId::generate();

        // when (操作):
        message.add_reaction(user_id.clone(), "👍");
        message.add_reaction(user_id.clone(), "❤️");

        // then (期待する結果):
        assert_eq!(message.reactions.len(), 2);
        assert_eq!(message.reactions.get("👍"), Some(&vec![user_id.clone()]));
        assert_eq!(message.reactions.get("❤️"), Some(&vec![user_id]));
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        // テスト項目: 同じユーザーの既読付与を 2 回適用しても結果は 1 回と同じ
        // given (前提条件):
        let mut message = create_test_message();
        let user_id = UserId::generate();

        // when (操作):
        message.mark_read(user_id.clone());
        message.mark_read(user_id.clone());

        // then (期待する結果):
        assert_eq!(message.read_by, vec![user_id]);
    }
}
