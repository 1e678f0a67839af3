use crate::domain::{
    Booking, BookingDraft, BookingSelection,
    value_objects::{BookingId, BookingStatus, ItemId, Page, UserId},
};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// BookingStoreのモック実装
///
/// インメモリのマップと単調増加カウンタで永続ストアと同じ契約を満たす。
/// セレクションの解釈は`BookingSelection::matches`をそのまま使う
/// （述語の定義はドメイン層の1箇所のみ）。
#[allow(dead_code)]
pub struct BookingStore {
    bookings: Mutex<HashMap<BookingId, Booking>>,
    next_id: AtomicI64,
}

#[allow(dead_code)]
impl BookingStore {
    pub fn new() -> Self {
        Self {
            bookings: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// セレクションに合致する予約を収集して開始時刻でソートする
    fn collect_sorted<F>(&self, pred: F, ascending: bool) -> Vec<Booking>
    where
        F: Fn(&Booking) -> bool,
    {
        let bookings = self.bookings.lock().unwrap();
        let mut selected: Vec<Booking> = bookings.values().filter(|b| pred(b)).cloned().collect();
        if ascending {
            selected.sort_by_key(|b| b.period.start());
        } else {
            selected.sort_by_key(|b| std::cmp::Reverse(b.period.start()));
        }
        selected
    }

    fn apply_page(selected: Vec<Booking>, page: Page) -> Vec<Booking> {
        selected
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect()
    }
}

impl Default for BookingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    /// 単調増加カウンタで採番して保存
    async fn insert(&self, draft: BookingDraft) -> Result<Booking> {
        let id = BookingId::from_i64(self.next_id.fetch_add(1, Ordering::SeqCst));
        let booking = draft.with_id(id);
        self.bookings.lock().unwrap().insert(id, booking.clone());
        Ok(booking)
    }

    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        Ok(self.bookings.lock().unwrap().get(&booking_id).cloned())
    }

    /// ロック内で状態確認と更新を行う条件付き書き込み
    async fn finalize_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<Option<Booking>> {
        let mut bookings = self.bookings.lock().unwrap();
        match bookings.get_mut(&booking_id) {
            Some(booking) if booking.status.is_waiting() => {
                booking.status = status;
                booking.updated_at = decided_at;
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_by_booker(
        &self,
        booker_id: UserId,
        selection: &BookingSelection,
        page: Page,
    ) -> Result<Vec<Booking>> {
        let selected = self.collect_sorted(
            |b| b.booker_id == booker_id && selection.matches(b),
            false,
        );
        Ok(Self::apply_page(selected, page))
    }

    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        selection: &BookingSelection,
        page: Page,
    ) -> Result<Vec<Booking>> {
        let selected = self.collect_sorted(
            |b| item_ids.contains(&b.item_id) && selection.matches(b),
            false,
        );
        Ok(Self::apply_page(selected, page))
    }

    async fn find_by_item_excluding_status(
        &self,
        item_id: ItemId,
        excluded: BookingStatus,
    ) -> Result<Vec<Booking>> {
        Ok(self.collect_sorted(|b| b.item_id == item_id && b.status != excluded, true))
    }

    async fn find_by_items_excluding_status(
        &self,
        item_ids: &[ItemId],
        excluded: BookingStatus,
    ) -> Result<Vec<Booking>> {
        Ok(self.collect_sorted(
            |b| item_ids.contains(&b.item_id) && b.status != excluded,
            true,
        ))
    }

    async fn has_completed_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        end_before: DateTime<Utc>,
    ) -> Result<bool> {
        let bookings = self.bookings.lock().unwrap();
        Ok(bookings.values().any(|b| {
            b.booker_id == booker_id && b.item_id == item_id && b.period.end() < end_before
        }))
    }
}
