//! ルームのメンバーシップ表
//!
//! ルームごとのメンバー集合と、接続ごとのアクティブなルームを管理する。
//! 1 接続につき同時に参加できるルームは 1 つで、join は前のルームを自動で
//! 離脱する。空になったルームは削除されるが、デフォルトルームだけは常に残る。
//!
//! マルチルーム化する場合はアクティブルームを `ConnectionId → RoomId` から
//! `ConnectionId → BTreeSet<RoomId>` に広げれば、呼び出し側の配信先計算は
//! そのまま使える。

use std::collections::{BTreeSet, HashMap};

use super::value_object::{ConnectionId, RoomId, UserId};

/// join の結果
#[derive(Debug, Clone, PartialEq)]
pub struct RoomJoin {
    /// 参加前からルームにいたメンバー（参加通知の宛先）
    pub prior_members: BTreeSet<UserId>,
    /// 自動で離脱した前のルームと、その残メンバー（離脱通知の宛先）
    pub auto_left: Option<(RoomId, BTreeSet<UserId>)>,
}

/// ルーム ID → メンバー集合、接続 → アクティブルームの対応表
#[derive(Debug)]
pub struct RoomTable {
    members: HashMap<RoomId, BTreeSet<UserId>>,
    active: HashMap<ConnectionId, (RoomId, UserId)>,
}

impl RoomTable {
    pub fn new() -> Self {
        let mut members = HashMap::new();
        members.insert(RoomId::general(), BTreeSet::new());
        Self {
            members,
            active: HashMap::new(),
        }
    }

    /// ルームに参加する
    ///
    /// 接続が別のルームに参加中の場合は先にそのルームを離脱してから参加する。
    /// メンバー集合の更新はこの呼び出しの中で完結する（途中状態は外から
    /// 観測されない）。
    pub fn join(&mut self, connection_id: ConnectionId, user_id: UserId, room: RoomId) -> RoomJoin {
        let auto_left = match self.active.get(&connection_id) {
            Some((current, _)) if *current != room => {
                let current = current.clone();
                let remaining = self.remove_member(&current, &user_id);
                Some((current, remaining))
            }
            _ => None,
        };

        let prior_members = {
            let set = self.members.entry(room.clone()).or_default();
            let prior: BTreeSet<UserId> =
                set.iter().filter(|id| **id != user_id).cloned().collect();
            set.insert(user_id.clone());
            prior
        };

        self.active.insert(connection_id, (room, user_id));

        RoomJoin {
            prior_members,
            auto_left,
        }
    }

    /// ルームを離脱する
    ///
    /// メンバーだった場合は残メンバー集合を返す。メンバーでなければ
    /// 何もせず None を返す。
    pub fn leave(
        &mut self,
        connection_id: &ConnectionId,
        user_id: &UserId,
        room: &RoomId,
    ) -> Option<BTreeSet<UserId>> {
        if !self
            .members
            .get(room)
            .is_some_and(|set| set.contains(user_id))
        {
            return None;
        }

        let remaining = self.remove_member(room, user_id);
        if self
            .active
            .get(connection_id)
            .is_some_and(|(active_room, _)| active_room == room)
        {
            self.active.remove(connection_id);
        }

        Some(remaining)
    }

    /// ルームのメンバー集合を取得
    ///
    /// 未知の（または削除済みの）ルームは空集合を返す。
    pub fn members_of(&self, room: &RoomId) -> BTreeSet<UserId> {
        self.members.get(room).cloned().unwrap_or_default()
    }

    /// 接続のアクティブなルームを取得
    pub fn active_room_of(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.active.get(connection_id).map(|(room, _)| room)
    }

    /// 切断時のクリーンアップ
    ///
    /// 接続がルームに参加していた場合、そこから離脱させて
    /// (ルーム, 残メンバー) を返す。
    pub fn remove_connection(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Option<(RoomId, BTreeSet<UserId>)> {
        let (room, user_id) = self.active.remove(connection_id)?;
        let remaining = self.remove_member(&room, &user_id);
        Some((room, remaining))
    }

    /// メンバーを集合から外し、残メンバーを返す。空になったルームは
    /// デフォルトルームを除いて削除する。
    fn remove_member(&mut self, room: &RoomId, user_id: &UserId) -> BTreeSet<UserId> {
        let Some(set) = self.members.get_mut(room) else {
            return BTreeSet::new();
        };
        set.remove(user_id);
        let remaining = set.clone();
        if remaining.is_empty() && *room != RoomId::general() {
            self.members.remove(room);
        }
        remaining
    }
}

impl Default for RoomTable {
    fn default() -> Self {
        Self::new()
    }
}
