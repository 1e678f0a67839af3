#![allow(dead_code)]

/// 予約決定のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecideBookingError {
    /// 既に決定済み（Approved または Rejected）
    AlreadyDecided,
}
