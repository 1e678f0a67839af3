use thiserror::Error;

/// 予約管理アプリケーション層のエラー
///
/// すべて呼び出し単位で終端のエラー。内部でのリトライは行わず、
/// トランスポート層がユーザー向けレスポンスへ変換する。
#[derive(Debug, Error)]
pub enum BookingApplicationError {
    /// 利用者が存在しない
    #[error("User not found")]
    UserNotFound,

    /// 物品が存在しない
    ///
    /// 自分の物品への予約もこのエラーになる（意図的なシグナル再利用、
    /// `create_booking`参照）。
    #[error("Item not found")]
    ItemNotFound,

    /// 予約が見つからない
    #[error("Booking not found")]
    BookingNotFound,

    /// 閲覧・操作の権限がない
    #[error("Access denied")]
    AccessDenied,

    /// リクエストが不正（物品が貸出不可、決定済み予約への再決定、
    /// 不正な時間範囲・フィルタ・ページ指定）
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 予約ストアのエラー
    #[error("Booking store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 利用者ディレクトリのエラー
    #[error("User directory error")]
    DirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 物品カタログのエラー
    #[error("Item catalog error")]
    CatalogError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookingApplicationError>;
