#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, BookingPeriod, BookingStatus, DecideBookingError, ItemId, UserId};

/// Booking集約 - 1つの物品に対する1件の予約リクエスト
///
/// 物品と予約者への参照はID参照のみ（集約境界の維持）。
/// item_id と booker_id は作成後不変。ステータスは承認決定時に
/// ちょうど1回だけ変更される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    // 識別子
    pub booking_id: BookingId,

    // 他の集約への参照（IDのみ）
    pub item_id: ItemId,
    pub booker_id: UserId,

    // 予約管理の責務
    pub period: BookingPeriod,
    pub status: BookingStatus,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 採番前の予約（ドラフト）
///
/// IDの割り当てはストアの責務のため、ドメイン層はID抜きの
/// ドラフトを生成し、ストアが挿入時にBookingへ昇格させる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub item_id: ItemId,
    pub booker_id: UserId,
    pub period: BookingPeriod,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingDraft {
    /// ストアが割り当てたIDでBookingへ昇格させる
    pub fn with_id(self, booking_id: BookingId) -> Booking {
        Booking {
            booking_id,
            item_id: self.item_id,
            booker_id: self.booker_id,
            period: self.period,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// 純粋関数：予約をリクエストする
///
/// ビジネスルール：
/// - 初期ステータスは Waiting（唯一の初期状態）
/// - 期間の妥当性（start < end）はBookingPeriodの構築時に保証済み
///
/// 副作用なし。採番前のドラフトを返す。
pub fn request_booking(
    item_id: ItemId,
    booker_id: UserId,
    period: BookingPeriod,
    requested_at: DateTime<Utc>,
) -> BookingDraft {
    BookingDraft {
        item_id,
        booker_id,
        period,
        status: BookingStatus::Waiting,
        created_at: requested_at,
        updated_at: requested_at,
    }
}

/// 純粋関数：予約を決定する（承認または却下）
///
/// ビジネスルール：
/// - Waiting状態の予約のみ決定可能
/// - approved なら Approved、そうでなければ Rejected
/// - Approved / Rejected は終端状態（再決定不可）
///
/// 副作用なし。新しいBookingを返す。
pub fn decide_booking(
    booking: &Booking,
    approved: bool,
    decided_at: DateTime<Utc>,
) -> Result<Booking, DecideBookingError> {
    if !booking.status.is_waiting() {
        return Err(DecideBookingError::AlreadyDecided);
    }

    let status = if approved {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    };

    Ok(Booking {
        status,
        updated_at: decided_at,
        ..booking.clone()
    })
}
