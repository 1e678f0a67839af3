use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait, UserRef};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// UserDirectoryのモック実装
///
/// 利用者IDを保存することで状態を持ったテストをサポート。
/// 既存アカウントを登録可能。
#[allow(dead_code)]
pub struct UserDirectory {
    known_users: Mutex<HashSet<UserId>>,
}

#[allow(dead_code)]
impl UserDirectory {
    pub fn new() -> Self {
        Self {
            known_users: Mutex::new(HashSet::new()),
        }
    }

    /// テスト用に既存アカウントを登録
    pub fn add_user(&self, user_id: UserId) {
        self.known_users.lock().unwrap().insert(user_id);
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    /// 登録済みの利用者のみ解決できる
    async fn resolve(&self, user_id: UserId) -> Result<Option<UserRef>> {
        let known = self.known_users.lock().unwrap().contains(&user_id);
        Ok(known.then_some(UserRef { user_id }))
    }
}
