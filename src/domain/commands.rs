use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, BookingPeriod, ItemId, UserId};

/// コマンド：予約を作成する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBooking {
    pub item_id: ItemId,
    pub booker_id: UserId,
    pub period: BookingPeriod,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：予約を承認または却下する
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecideBooking {
    pub booking_id: BookingId,
    pub approved: bool,
    pub acting_user_id: UserId,
    pub decided_at: DateTime<Utc>,
}
