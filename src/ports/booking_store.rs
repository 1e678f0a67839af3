use crate::domain::{
    Booking, BookingDraft, BookingSelection,
    value_objects::{BookingId, BookingStatus, ItemId, Page, UserId},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 予約ストアポート
///
/// 予約レコードの永続化と時間・ステータス条件付きクエリを抽象化する。
/// フィルタリングはすべてアダプタ側へ押し下げ、無関係な予約を
/// メモリに読み込まない。採番はストアの責務。
#[allow(dead_code)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// ドラフトを永続化し、採番済みのBookingを返す
    ///
    /// IDの一意性はストアが保証する。
    async fn insert(&self, draft: BookingDraft) -> Result<Booking>;

    /// IDで予約を取得する
    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// ステータスを条件付きで確定する
    ///
    /// 現在のステータスがWaitingの場合に限り`status`へ更新する
    /// （条件付き書き込み）。条件を満たさない場合は`None`を返す。
    /// 同一予約への並行承認は片方だけが`Some`を観測する。
    async fn finalize_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<Option<Booking>>;

    /// 予約者の予約をセレクション付きで検索する
    ///
    /// 開始時刻の降順。`page`でオフセット・件数を制限する。
    async fn find_by_booker(
        &self,
        booker_id: UserId,
        selection: &BookingSelection,
        page: Page,
    ) -> Result<Vec<Booking>>;

    /// 物品ID集合に対する予約をセレクション付きで検索する
    ///
    /// 所有者側の一覧取得に使用される。開始時刻の降順、ページ指定付き。
    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        selection: &BookingSelection,
        page: Page,
    ) -> Result<Vec<Booking>>;

    /// 指定ステータスを除外して物品の予約を検索する
    ///
    /// 直前・直後の予約分類に使用される。開始時刻の昇順、ページなし。
    async fn find_by_item_excluding_status(
        &self,
        item_id: ItemId,
        excluded: BookingStatus,
    ) -> Result<Vec<Booking>>;

    /// 指定ステータスを除外して物品ID集合の予約を検索する
    ///
    /// 一覧画面向けの一括分類に使用される。開始時刻の昇順、ページなし。
    async fn find_by_items_excluding_status(
        &self,
        item_ids: &[ItemId],
        excluded: BookingStatus,
    ) -> Result<Vec<Booking>>;

    /// 利用者がその物品の利用を完了した予約を持つか
    ///
    /// `end_before`より前に終了した予約の存在確認。
    /// コメント投稿資格の判定（外部コンポーネント）に使用される。
    async fn has_completed_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        end_before: DateTime<Utc>,
    ) -> Result<bool>;
}
