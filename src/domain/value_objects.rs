#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 予約ID - 予約管理コンテキストの集約ID
///
/// 採番はストアの責務（挿入時に割り当て）。ドメイン層では生成しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookingId(i64);

impl BookingId {
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 物品ID - カタログ管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(i64);

impl ItemId {
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 利用者ID - 利用者管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 予約ステータス
///
/// 状態遷移は Waiting -> Approved / Waiting -> Rejected のみ。
/// Approved と Rejected は終端状態で、以後の変更は不可。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// 承認待ち
    Waiting,
    /// 承認済み
    Approved,
    /// 却下
    Rejected,
}

impl BookingStatus {
    /// 文字列表現を取得する（永続化・レスポンスで使用）
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "waiting",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
        }
    }

    /// 承認待ちか（決定可能な唯一の状態）
    pub fn is_waiting(&self) -> bool {
        matches!(self, BookingStatus::Waiting)
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(BookingStatus::Waiting),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

/// 予約期間エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingPeriodError {
    /// 終了時刻が開始時刻より後でない
    EndNotAfterStart,
}

/// 予約期間
///
/// 不変条件：start < end。
/// 型システムでこの制約を強制し、不正な期間を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingPeriod {
    /// 期間を作成する
    ///
    /// # エラー
    /// `end <= start` の場合は`BookingPeriodError::EndNotAfterStart`を返す
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, BookingPeriodError> {
        if end <= start {
            return Err(BookingPeriodError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// 開始時刻
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// 終了時刻
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// ページ指定エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// オフセットが負
    NegativeOffset,
    /// 件数が1未満
    InvalidSize,
}

/// ページ指定（オフセット・件数）
///
/// 不変条件：offset >= 0、limit >= 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    offset: i64,
    limit: i64,
}

impl Page {
    /// ページ指定を作成する
    ///
    /// # エラー
    /// - `from < 0` の場合は`PageError::NegativeOffset`
    /// - `size < 1` の場合は`PageError::InvalidSize`
    pub fn new(from: i64, size: i64) -> Result<Self, PageError> {
        if from < 0 {
            return Err(PageError::NegativeOffset);
        }
        if size < 1 {
            return Err(PageError::InvalidSize);
        }
        Ok(Self {
            offset: from,
            limit: size,
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}
