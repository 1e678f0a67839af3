#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Booking, BookingStatus};

/// 一覧取得のステートフィルタ（閉じた集合）
///
/// パースは大文字・完全一致のみ。未知の入力はエラーとして呼び出し層で
/// 不正リクエスト扱いにする（サイレントにALLへフォールバックしない）。
/// パラメータ省略時のALL既定は呼び出し層の責務。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateFilter {
    /// すべての予約
    All,
    /// 進行中（start <= now < end）
    Current,
    /// 終了済み（end < now）
    Past,
    /// 未来（start > now）
    Future,
    /// ステータスがWaiting
    Waiting,
    /// ステータスがRejected
    Rejected,
}

impl StateFilter {
    /// 分類時点 `now` を固定してセレクションへ変換する
    ///
    /// `now` は呼び出しごとに1回だけサンプリングし、1レスポンス内で
    /// 境界判定が揺れないようにする。
    pub fn selection(self, now: DateTime<Utc>) -> BookingSelection {
        match self {
            StateFilter::All => BookingSelection::All,
            StateFilter::Current => BookingSelection::InProgressAt(now),
            StateFilter::Past => BookingSelection::EndedBefore(now),
            StateFilter::Future => BookingSelection::StartsAfter(now),
            StateFilter::Waiting => BookingSelection::WithStatus(BookingStatus::Waiting),
            StateFilter::Rejected => BookingSelection::WithStatus(BookingStatus::Rejected),
        }
    }
}

impl std::str::FromStr for StateFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(StateFilter::All),
            "CURRENT" => Ok(StateFilter::Current),
            "PAST" => Ok(StateFilter::Past),
            "FUTURE" => Ok(StateFilter::Future),
            "WAITING" => Ok(StateFilter::Waiting),
            "REJECTED" => Ok(StateFilter::Rejected),
            _ => Err(format!("Unknown state filter: {}", s)),
        }
    }
}

/// 予約セレクション - フィルタと分類時点を束ねた実行可能な述語
///
/// 述語の定義はここが唯一の箇所。インメモリ実装は`matches`を直接解釈し、
/// Postgres実装は同じ意味のWHERE句へ変換する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingSelection {
    /// 無条件
    All,
    /// 進行中（start <= t < end）
    InProgressAt(DateTime<Utc>),
    /// 終了済み（end < t）
    EndedBefore(DateTime<Utc>),
    /// 未来（start > t）
    StartsAfter(DateTime<Utc>),
    /// ステータス完全一致
    WithStatus(BookingStatus),
}

impl BookingSelection {
    /// 予約がこのセレクションに合致するか
    pub fn matches(&self, booking: &Booking) -> bool {
        match *self {
            BookingSelection::All => true,
            BookingSelection::InProgressAt(t) => {
                booking.period.start() <= t && booking.period.end() > t
            }
            BookingSelection::EndedBefore(t) => booking.period.end() < t,
            BookingSelection::StartsAfter(t) => booking.period.start() > t,
            BookingSelection::WithStatus(status) => booking.status == status,
        }
    }
}

/// 物品詳細に表示する直前・直後の予約
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LastNext {
    /// 終了時刻がnowより前の予約のうち、終了が最も遅いもの
    pub last: Option<Booking>,
    /// 開始時刻がnowより後の予約のうち、開始が最も早いもの
    pub next: Option<Booking>,
}

/// 純粋関数：直前・直後の予約を選ぶ
///
/// 入力はWaitingを除外済みの予約列を想定する（未承認のリクエストを
/// 確定済みの予約であるかのように表示しない）。
/// - last: `end < now` の中で end が最大のもの
/// - next: `start > now` の中で start が最小のもの
/// 境界上（end == now、start == now）の予約はどちらにも含めない。
pub fn pick_last_next<'a>(
    bookings: &'a [Booking],
    now: DateTime<Utc>,
) -> (Option<&'a Booking>, Option<&'a Booking>) {
    let last = bookings
        .iter()
        .filter(|b| b.period.end() < now)
        .max_by_key(|b| b.period.end());

    let next = bookings
        .iter()
        .filter(|b| b.period.start() > now)
        .min_by_key(|b| b.period.start());

    (last, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingId, BookingPeriod, ItemId, UserId, booking::request_booking};
    use chrono::Duration;

    fn booking_at(
        id: i64,
        now: DateTime<Utc>,
        start_h: i64,
        end_h: i64,
        status: BookingStatus,
    ) -> Booking {
        let period = BookingPeriod::new(now + Duration::hours(start_h), now + Duration::hours(end_h))
            .unwrap();
        let mut booking = request_booking(ItemId::from_i64(1), UserId::from_i64(2), period, now)
            .with_id(BookingId::from_i64(id));
        booking.status = status;
        booking
    }

    // TDD: StateFilter のパース
    #[test]
    fn test_state_filter_parses_known_values() {
        assert_eq!("ALL".parse::<StateFilter>().unwrap(), StateFilter::All);
        assert_eq!("CURRENT".parse::<StateFilter>().unwrap(), StateFilter::Current);
        assert_eq!("PAST".parse::<StateFilter>().unwrap(), StateFilter::Past);
        assert_eq!("FUTURE".parse::<StateFilter>().unwrap(), StateFilter::Future);
        assert_eq!("WAITING".parse::<StateFilter>().unwrap(), StateFilter::Waiting);
        assert_eq!("REJECTED".parse::<StateFilter>().unwrap(), StateFilter::Rejected);
    }

    #[test]
    fn test_state_filter_rejects_unknown_value() {
        assert!("APPROVED".parse::<StateFilter>().is_err());
        assert!("all".parse::<StateFilter>().is_err()); // 大文字のみ
        assert!("".parse::<StateFilter>().is_err());
    }

    // TDD: BookingSelection::matches のテスト
    #[test]
    fn test_selection_in_progress_includes_start_boundary() {
        let now = Utc::now();
        // start == now の予約は進行中に含める（start <= now < end）
        let booking = booking_at(1, now, 0, 2, BookingStatus::Approved);

        assert!(BookingSelection::InProgressAt(now).matches(&booking));
        assert!(!BookingSelection::StartsAfter(now).matches(&booking));
        assert!(!BookingSelection::EndedBefore(now).matches(&booking));
    }

    #[test]
    fn test_selection_in_progress_excludes_end_boundary() {
        let now = Utc::now();
        // end == now の予約は進行中に含めない
        let booking = booking_at(1, now, -2, 0, BookingStatus::Approved);

        assert!(!BookingSelection::InProgressAt(now).matches(&booking));
        // end < now でもないため、境界上はどの時間区分にも入らない瞬間がない
        // （end == now は次の瞬間からPASTになる）
        assert!(!BookingSelection::EndedBefore(now).matches(&booking));
    }

    #[test]
    fn test_selection_with_status() {
        let now = Utc::now();
        let booking = booking_at(1, now, 1, 2, BookingStatus::Waiting);

        assert!(BookingSelection::WithStatus(BookingStatus::Waiting).matches(&booking));
        assert!(!BookingSelection::WithStatus(BookingStatus::Rejected).matches(&booking));
    }

    /// 時間区分（CURRENT / PAST / FUTURE）は固定したnowに対して
    /// 網羅的かつ相互排他的であること
    #[test]
    fn test_temporal_partitions_are_exhaustive_and_exclusive() {
        let now = Utc::now();
        let candidates = [
            booking_at(1, now, -3, -1, BookingStatus::Approved), // past
            booking_at(2, now, -1, 1, BookingStatus::Approved),  // current
            booking_at(3, now, 1, 3, BookingStatus::Approved),   // future
            booking_at(4, now, 0, 1, BookingStatus::Approved),   // start == now -> current
        ];

        for booking in &candidates {
            let buckets = [
                BookingSelection::InProgressAt(now).matches(booking),
                BookingSelection::EndedBefore(now).matches(booking),
                BookingSelection::StartsAfter(now).matches(booking),
            ];
            let matched = buckets.iter().filter(|&&m| m).count();
            assert_eq!(
                matched, 1,
                "booking {:?} matched {} temporal buckets",
                booking.booking_id, matched
            );
        }
    }

    /// ステータスフィルタ（WAITING / REJECTED）は高々1つに合致すること
    #[test]
    fn test_status_filters_match_at_most_one() {
        let now = Utc::now();
        for status in [
            BookingStatus::Waiting,
            BookingStatus::Approved,
            BookingStatus::Rejected,
        ] {
            let booking = booking_at(1, now, 1, 2, status);
            let matched = [
                BookingSelection::WithStatus(BookingStatus::Waiting).matches(&booking),
                BookingSelection::WithStatus(BookingStatus::Rejected).matches(&booking),
            ]
            .iter()
            .filter(|&&m| m)
            .count();
            assert!(matched <= 1);
        }
    }

    /// シナリオ：start=now+1h, end=now+2h, status=WAITING の予約は
    /// FUTUREとWAITINGに合致し、CURRENT / PAST / REJECTEDには合致しない
    #[test]
    fn test_future_waiting_booking_scenario() {
        let now = Utc::now();
        let booking = booking_at(1, now, 1, 2, BookingStatus::Waiting);

        assert!(StateFilter::Future.selection(now).matches(&booking));
        assert!(StateFilter::Waiting.selection(now).matches(&booking));
        assert!(!StateFilter::Current.selection(now).matches(&booking));
        assert!(!StateFilter::Past.selection(now).matches(&booking));
        assert!(!StateFilter::Rejected.selection(now).matches(&booking));
        assert!(StateFilter::All.selection(now).matches(&booking));
    }

    // TDD: pick_last_next のテスト
    #[test]
    fn test_pick_last_next_basic() {
        let now = Utc::now();
        let bookings = vec![
            booking_at(1, now, -10, -8, BookingStatus::Approved),
            booking_at(2, now, -5, -3, BookingStatus::Approved),
            booking_at(3, now, 2, 4, BookingStatus::Approved),
            booking_at(4, now, 6, 8, BookingStatus::Approved),
        ];

        let (last, next) = pick_last_next(&bookings, now);

        // last は終了が最も遅い過去の予約
        assert_eq!(last.unwrap().booking_id, BookingId::from_i64(2));
        // next は開始が最も早い未来の予約
        assert_eq!(next.unwrap().booking_id, BookingId::from_i64(3));
    }

    #[test]
    fn test_pick_last_next_absent_when_no_candidates() {
        let now = Utc::now();
        // 進行中の予約のみ：lastにもnextにも該当しない
        let bookings = vec![booking_at(1, now, -1, 1, BookingStatus::Approved)];

        let (last, next) = pick_last_next(&bookings, now);
        assert!(last.is_none());
        assert!(next.is_none());
    }

    #[test]
    fn test_pick_last_next_excludes_boundaries() {
        let now = Utc::now();
        let bookings = vec![
            booking_at(1, now, -2, 0, BookingStatus::Approved), // end == now
            booking_at(2, now, 0, 2, BookingStatus::Approved),  // start == now
        ];

        let (last, next) = pick_last_next(&bookings, now);
        // 「厳密に前」「厳密に後」のみが候補
        assert!(last.is_none());
        assert!(next.is_none());
    }

    #[test]
    fn test_pick_last_next_empty_input() {
        let now = Utc::now();
        let (last, next) = pick_last_next(&[], now);
        assert!(last.is_none());
        assert!(next.is_none());
    }
}
