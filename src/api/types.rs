use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::booking::BookingDetails;
use crate::domain::value_objects::BookingPeriod;

/// 予約作成リクエスト（POST /bookings）
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub item_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CreateBookingRequest {
    /// 時間範囲の呼び出し層バリデーション
    ///
    /// エンジンに到達する前に検証するルール：
    /// - start >= now（過去開始の予約は不可）
    /// - end > now
    /// - end > start
    pub fn validate_period(&self, now: DateTime<Utc>) -> Result<BookingPeriod, String> {
        if self.start < now {
            return Err("Booking start must not be in the past".to_string());
        }
        if self.end <= now {
            return Err("Booking end must be in the future".to_string());
        }
        BookingPeriod::new(self.start, self.end)
            .map_err(|_| "Booking end must be after start".to_string())
    }
}

/// 決定クエリパラメータ（PATCH /bookings/:id?approved=...）
#[derive(Debug, Deserialize)]
pub struct ApproveQuery {
    pub approved: bool,
}

/// 一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    /// ステートフィルタ（省略時はALL、未知の値は400）
    pub state: Option<String>,
    /// ページオフセット（省略時は0）
    pub from: Option<i64>,
    /// ページ件数（省略時は10）
    pub size: Option<i64>,
}

/// 物品スナップショットのレスポンス表現
#[derive(Debug, Serialize)]
pub struct ItemSummary {
    pub item_id: i64,
    pub available: bool,
    pub owner_id: i64,
}

/// 予約者スナップショットのレスポンス表現
#[derive(Debug, Serialize)]
pub struct BookerSummary {
    pub user_id: i64,
}

/// 予約レスポンス（作成・決定・取得・一覧で共通）
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: String,
    pub item: ItemSummary,
    pub booker: BookerSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        Self {
            booking_id: details.booking.booking_id.value(),
            start: details.booking.period.start(),
            end: details.booking.period.end(),
            status: details.booking.status.as_str().to_string(),
            item: ItemSummary {
                item_id: details.item.item_id.value(),
                available: details.item.available,
                owner_id: details.item.owner_id.value(),
            },
            booker: BookerSummary {
                user_id: details.booker.user_id.value(),
            },
            created_at: details.booking.created_at,
            updated_at: details.booking.updated_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error_type.into(),
            message: message.into(),
        }
    }
}
