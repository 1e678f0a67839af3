use crate::domain::value_objects::{ItemId, UserId};
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 物品スナップショット
///
/// 予約コンテキストが必要とするのは貸出可否と所有者のみ。
/// 所有者IDは承認・所有者側一覧の認可アンカーになる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef {
    pub item_id: ItemId,
    pub available: bool,
    pub owner_id: UserId,
}

/// 物品カタログポート
///
/// 予約コンテキストとカタログ管理コンテキストの境界を維持する。
/// 予約コンテキストはItemIDのみを知り、物品詳細（名称・説明）は知らない。
#[allow(dead_code)]
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// 物品IDをスナップショットに解決する
    ///
    /// 予約作成・承認時の物品バリデーションに使用される。
    /// 存在しない場合は`None`を返す。
    async fn resolve(&self, item_id: ItemId) -> Result<Option<ItemRef>>;

    /// 所有者の物品ID一覧を取得する
    ///
    /// 所有者側の予約一覧のスコープ決定に使用される。
    /// 物品を持たない所有者には空の一覧を返す。
    async fn list_item_ids_by_owner(&self, owner_id: UserId) -> Result<Vec<ItemId>>;
}
