use crate::domain::value_objects::{ItemId, UserId};
use crate::ports::item_catalog::{ItemCatalog as ItemCatalogTrait, ItemRef, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// ItemCatalogのモック実装
///
/// 物品スナップショットを保存することで状態を持ったテストをサポート。
/// 貸出可否と所有者を含めて登録可能。
#[allow(dead_code)]
pub struct ItemCatalog {
    items: Mutex<HashMap<ItemId, ItemRef>>,
}

#[allow(dead_code)]
impl ItemCatalog {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }

    /// テスト用に物品を登録
    pub fn add_item(&self, item_id: ItemId, owner_id: UserId, available: bool) {
        self.items.lock().unwrap().insert(
            item_id,
            ItemRef {
                item_id,
                available,
                owner_id,
            },
        );
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemCatalogTrait for ItemCatalog {
    /// 登録済みの物品のみ解決できる
    async fn resolve(&self, item_id: ItemId) -> Result<Option<ItemRef>> {
        Ok(self.items.lock().unwrap().get(&item_id).copied())
    }

    /// 所有者の物品ID一覧（ID昇順）
    async fn list_item_ids_by_owner(&self, owner_id: UserId) -> Result<Vec<ItemId>> {
        let items = self.items.lock().unwrap();
        let mut ids: Vec<ItemId> = items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .map(|item| item.item_id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
