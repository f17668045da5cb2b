//! 入力中インジケータの管理
//!
//! 接続ごとの「入力中」状態を挿入順で保持する。純粋なインメモリ状態で、
//! 明示的な停止シグナルか切断でのみ消える。永続化はしない。

use super::entity::TypingEntry;
use super::value_object::{ConnectionId, UserId, Username};

/// 入力中の接続の一覧（挿入順）
#[derive(Debug, Default)]
pub struct TypingRoster {
    entries: Vec<(ConnectionId, TypingEntry)>,
}

impl TypingRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力中状態を更新し、更新後のスナップショットを返す
    ///
    /// `is_typing` が true なら upsert、false なら削除。
    pub fn set(
        &mut self,
        connection_id: &ConnectionId,
        user_id: UserId,
        username: Username,
        is_typing: bool,
    ) -> Vec<TypingEntry> {
        if is_typing {
            let entry = TypingEntry { user_id, username };
            match self.entries.iter_mut().find(|(id, _)| id == connection_id) {
                Some((_, existing)) => *existing = entry,
                None => self.entries.push((connection_id.clone(), entry)),
            }
        } else {
            self.entries.retain(|(id, _)| id != connection_id);
        }

        self.snapshot()
    }

    /// 接続のエントリを削除し、変化があったかを返す
    ///
    /// 切断時と明示的な停止シグナルで呼ばれる。
    pub fn clear(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| id != connection_id);
        self.entries.len() != before
    }

    /// 挿入順のスナップショット
    pub fn snapshot(&self) -> Vec<TypingEntry> {
        self.entries.iter().map(|(_, entry)| entry.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    #[test]
    fn test_set_typing_true_adds_entry() {
        // テスト項目: 入力開始でエントリが追加され、スナップショットに現れる
        // given (前提条件):
        let mut roster = TypingRoster::new();
        let conn = ConnectionId::generate();
        let user_id = UserId::generate();

        // when (操作):
        let snapshot = roster.set(&conn, user_id.clone(), username("alice"), true);

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].user_id, user_id);
        assert_eq!(snapshot[0].username.as_str(), "alice");
    }

    #[test]
    fn test_set_typing_false_removes_entry() {
        // テスト項目: 停止シグナルでエントリが消える
        // given (前提条件): alice が入力中
        let mut roster = TypingRoster::new();
        let conn = ConnectionId::generate();
        let user_id = UserId::generate();
        roster.set(&conn, user_id.clone(), username("alice"), true);

        // when (操作):
        let snapshot = roster.set(&conn, user_id, username("alice"), false);

        // then (期待する結果):
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        // テスト項目: スナップショットが挿入順を保つ
        // given (前提条件):
        let mut roster = TypingRoster::new();
        let conn1 = ConnectionId::generate();
        let conn2 = ConnectionId::generate();
        let conn3 = ConnectionId::generate();
        roster.set(&conn1, UserId::generate(), username("charlie"), true);
        roster.set(&conn2, UserId::generate(), username("alice"), true);
        roster.set(&conn3, UserId::generate(), username("bob"), true);

        // when (操作): 既存エントリを更新しても順序は変わらない
        let first_user = roster.snapshot()[0].user_id.clone();
        let snapshot = roster.set(&conn1, first_user, username("charlie"), true);

        // then (期待する結果):
        let names: Vec<&str> = snapshot.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["charlie", "alice", "bob"]);
    }

    #[test]
    fn test_clear_removes_entry_on_disconnect() {
        // テスト項目: clear で接続のエントリが消え、変化の有無が返される
        // given (前提条件): alice が入力中のまま切断する
        let mut roster = TypingRoster::new();
        let conn = ConnectionId::generate();
        roster.set(&conn, UserId::generate(), username("alice"), true);

        // when (操作):
        let changed = roster.clear(&conn);

        // then (期待する結果):
        assert!(changed);
        assert!(roster.snapshot().is_empty());

        // 既に消えている接続の clear は変化なし
        assert!(!roster.clear(&conn));
    }
}
