use crate::application::booking::BookingApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(BookingApplicationError);

impl From<BookingApplicationError> for ApiError {
    fn from(err: BookingApplicationError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    /// 呼び出し層バリデーション違反用のショートハンド
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError(BookingApplicationError::InvalidRequest(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            // （自物品の予約もItemNotFoundとしてここに落ちる）
            BookingApplicationError::UserNotFound => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            BookingApplicationError::ItemNotFound => {
                (StatusCode::NOT_FOUND, "ITEM_NOT_FOUND", "Item not found".to_string())
            }
            BookingApplicationError::BookingNotFound => (
                StatusCode::NOT_FOUND,
                "BOOKING_NOT_FOUND",
                "Booking not found".to_string(),
            ),

            // 403 Forbidden - 認可違反
            BookingApplicationError::AccessDenied => {
                (StatusCode::FORBIDDEN, "ACCESS_DENIED", "Access denied".to_string())
            }

            // 400 Bad Request - バリデーション・ビジネスルール違反
            BookingApplicationError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg)
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            BookingApplicationError::StoreError(ref e) => {
                tracing::error!("Booking store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Booking store error".to_string(),
                )
            }
            BookingApplicationError::DirectoryError(ref e) => {
                tracing::error!("User directory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DIRECTORY_ERROR",
                    "User directory error".to_string(),
                )
            }
            BookingApplicationError::CatalogError(ref e) => {
                tracing::error!("Item catalog error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_ERROR",
                    "Item catalog error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
