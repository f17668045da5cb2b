//! 接続とユーザーの対応表
//!
//! どの接続がどのユーザーとしてオンラインかを管理する、プロセス内で唯一の
//! 情報源。ユーザー 1 人につきアクティブな接続は 1 つで、同じユーザーが別の
//! 接続から bind し直した場合は新しい接続が勝つ（再接続が古いセッションを
//! 置き換える動き）。
//!
//! 永続化側の User レコード（is_online / last_seen）の更新は UseCase 層が
//! Repository に対して行う。ここはインメモリの束縛だけを持つ。

use std::collections::HashMap;

use super::value_object::{ConnectionId, UserId, Username};

/// 接続に束縛されたユーザー情報
///
/// `username` はゲートウェイへの往復を避けるための作業用コピー。
/// オンライン状態の正は常に永続化側にある。
#[derive(Debug, Clone, PartialEq)]
pub struct BoundUser {
    pub user_id: UserId,
    pub username: Username,
}

/// 接続 ↔ ユーザーの対応表
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: HashMap<ConnectionId, BoundUser>,
    by_user: HashMap<UserId, ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をユーザーに束縛する
    ///
    /// 同じユーザーが古い接続で束縛済みの場合は新しい接続が置き換え、
    /// 置き換えられた古い接続 ID を返す。呼び出し側は返された接続の
    /// 残留状態（ルーム・入力中）を掃除する。
    pub fn bind(
        &mut self,
        connection_id: ConnectionId,
        user_id: UserId,
        username: Username,
    ) -> Option<ConnectionId> {
        // 同じ接続がユーザーを変えて束縛し直す場合、前のユーザーの逆引きを消す
        if let Some(prev) = self.bindings.get(&connection_id) {
            if prev.user_id != user_id && self.by_user.get(&prev.user_id) == Some(&connection_id) {
                let prev_user = prev.user_id.clone();
                self.by_user.remove(&prev_user);
            }
        }

        let displaced = match self.by_user.get(&user_id) {
            Some(stale) if *stale != connection_id => {
                let stale = stale.clone();
                self.bindings.remove(&stale);
                Some(stale)
            }
            _ => None,
        };

        self.by_user.insert(user_id.clone(), connection_id.clone());
        self.bindings
            .insert(connection_id, BoundUser { user_id, username });

        displaced
    }

    /// 接続に束縛されたユーザーを取得
    pub fn resolve(&self, connection_id: &ConnectionId) -> Option<&BoundUser> {
        self.bindings.get(connection_id)
    }

    /// 束縛を解除し、直前のユーザー情報を返す（冪等）
    ///
    /// 既に解除済みの接続に対しては何もせず None を返す。
    pub fn unbind(&mut self, connection_id: &ConnectionId) -> Option<BoundUser> {
        let bound = self.bindings.remove(connection_id)?;
        // 別の接続が同じユーザーを束縛し直している場合、逆引きはそちらのもの
        if self.by_user.get(&bound.user_id) == Some(connection_id) {
            self.by_user.remove(&bound.user_id);
        }
        Some(bound)
    }

    /// ユーザーのアクティブな接続を取得
    pub fn connection_of(&self, user_id: &UserId) -> Option<&ConnectionId> {
        self.by_user.get(user_id)
    }

    /// 束縛済みの接続数
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
