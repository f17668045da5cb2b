//! InMemory User Repository 実装
//!
//! ドメイン層が定義する UserRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。ユーザー名の一意性は
//! このマップへの挿入が単一のロックの下で行われることで保証されます。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use idobata_shared::time::get_utc_timestamp;

use crate::domain::{
    ConnectionId, RepositoryError, Timestamp, User, UserId, UserRepository, Username,
};

/// インメモリ User Repository 実装
pub struct InMemoryUserRepository {
    /// ユーザー ID → User
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// 新しい InMemoryUserRepository を作成
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_or_create(&self, username: &Username) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;

        if let Some(user) = users.values().find(|u| u.username == *username) {
            return Ok(user.clone());
        }

        let user = User {
            id: UserId::generate(),
            username: username.clone(),
            is_online: false,
            last_connection_id: None,
            last_seen: Timestamp::new(get_utc_timestamp()),
        };
        users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn set_online(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;

        let user = users
            .get_mut(user_id)
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.as_str().to_string()))?;
        user.is_online = true;
        user.last_connection_id = Some(connection_id.clone());
        user.last_seen = Timestamp::new(get_utc_timestamp());

        Ok(user.clone())
    }

    async fn set_offline(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<User>, RepositoryError> {
        let mut users = self.users.lock().await;

        let Some(user) = users
            .values_mut()
            .find(|u| u.last_connection_id.as_ref() == Some(connection_id))
        else {
            return Ok(None);
        };
        user.is_online = false;
        user.last_connection_id = None;
        user.last_seen = Timestamp::new(get_utc_timestamp());

        Ok(Some(user.clone()))
    }

    async fn list_online(&self) -> Result<Vec<User>, RepositoryError> {
        let users = self.users.lock().await;

        let mut online: Vec<User> = users.values().filter(|u| u.is_online).cloned().collect();
        // 表示の安定のためユーザー名順
        online.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));

        Ok(online)
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).cloned())
    }
}
