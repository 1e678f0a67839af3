use crate::domain::value_objects::UserId;
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者スナップショット
///
/// 予約コンテキストが利用者について知る必要があるのはIDのみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRef {
    pub user_id: UserId,
}

/// 利用者ディレクトリポート
///
/// 予約コンテキストと利用者管理コンテキストの境界を維持する。
/// 予約コンテキストはUserIDのみを知り、アカウント詳細は知らない。
#[allow(dead_code)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 利用者IDを既存アカウントに解決する
    ///
    /// 予約作成・一覧取得前の利用者バリデーションに使用される。
    /// 存在しない場合は`None`を返す。
    async fn resolve(&self, user_id: UserId) -> Result<Option<UserRef>>;
}
