use crate::application::booking::{
    ServiceDependencies, approve_booking as execute_approve_booking,
    create_booking as execute_create_booking, get_booking_by_id as execute_get_booking_by_id,
    get_bookings_by_owner as execute_get_bookings_by_owner,
    get_bookings_by_user as execute_get_bookings_by_user,
};
use crate::domain::value_objects::{BookingId, ItemId, Page, PageError, UserId};
use crate::domain::{StateFilter, commands};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{ApproveQuery, BookingResponse, CreateBookingRequest, ListBookingsQuery},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// 操作主体を運ぶリクエストヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";

/// ヘッダーから操作主体の利用者IDを取り出す
///
/// 認証はトランスポートの外側の責務。ここではIDの形式のみ検証する。
fn acting_user_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::invalid_request("X-User-Id header is required"))?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .map(UserId::from_i64)
        .ok_or_else(|| ApiError::invalid_request("X-User-Id header must be a numeric id"))
}

/// ステートフィルタのパース
///
/// 省略時はALL。未知の値はサイレントにフォールバックせず400にする。
fn parse_state_filter(state: &Option<String>) -> Result<StateFilter, ApiError> {
    match state {
        None => Ok(StateFilter::All),
        Some(s) => s.parse::<StateFilter>().map_err(ApiError::invalid_request),
    }
}

/// ページ指定のパース（既定：from=0, size=10）
fn parse_page(query: &ListBookingsQuery) -> Result<Page, ApiError> {
    Page::new(query.from.unwrap_or(0), query.size.unwrap_or(10)).map_err(|e| {
        ApiError::invalid_request(match e {
            PageError::NegativeOffset => "from must not be negative",
            PageError::InvalidSize => "size must be at least 1",
        })
    })
}

// ============================================================================
// Command handlers (POST / PATCH)
// ============================================================================

/// POST /bookings - 新しい予約を作成
///
/// 物品への時間指定の予約リクエストを作成する。
///
/// 強制されるビジネスルール:
/// - 予約者が存在すること
/// - 物品が存在し、貸出可能であること
/// - 自分の物品は予約できないこと
/// - 時間範囲が妥当であること（start >= now, end > now, end > start）
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let booker_id = acting_user_id(&headers)?;

    let now = Utc::now();
    let period = req.validate_period(now).map_err(ApiError::invalid_request)?;

    let cmd = commands::CreateBooking {
        item_id: ItemId::from_i64(req.item_id),
        booker_id,
        period,
        requested_at: now,
    };

    let details = execute_create_booking(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(details))))
}

/// PATCH /bookings/:id?approved={true|false} - 予約を承認または却下
///
/// 強制されるビジネスルール:
/// - 予約が存在すること
/// - 操作者が物品の所有者であること
/// - 予約がWaiting状態であること（決定は1回のみ）
pub async fn approve_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
    Query(query): Query<ApproveQuery>,
    headers: HeaderMap,
) -> Result<Json<BookingResponse>, ApiError> {
    let acting_user_id = acting_user_id(&headers)?;

    let cmd = commands::DecideBooking {
        booking_id: BookingId::from_i64(booking_id),
        approved: query.approved,
        acting_user_id,
        decided_at: Utc::now(),
    };

    let details = execute_approve_booking(&state.service_deps, cmd).await?;

    Ok(Json(BookingResponse::from(details)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /bookings/:id - 予約詳細をIDで取得
///
/// 物品の所有者または予約者のみが閲覧できる。
pub async fn get_booking_by_id(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<BookingResponse>, ApiError> {
    let viewer_id = acting_user_id(&headers)?;

    let details = execute_get_booking_by_id(
        &state.service_deps,
        BookingId::from_i64(booking_id),
        viewer_id,
    )
    .await?;

    Ok(Json(BookingResponse::from(details)))
}

/// GET /bookings - 予約者側の予約一覧
///
/// クエリパラメータ:
/// - state: ステートフィルタ（ALL, CURRENT, PAST, FUTURE, WAITING, REJECTED）
/// - from / size: ページ指定
pub async fn list_bookings_by_booker(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBookingsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let user_id = acting_user_id(&headers)?;
    let filter = parse_state_filter(&query.state)?;
    let page = parse_page(&query)?;

    let bookings = execute_get_bookings_by_user(&state.service_deps, user_id, filter, page).await?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

/// GET /bookings/owner - 所有者側の予約一覧
///
/// 操作主体の所有物品に対する予約を一覧する。
/// 物品を持たない所有者には空の一覧を返す。
pub async fn list_bookings_by_owner(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBookingsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let owner_id = acting_user_id(&headers)?;
    let filter = parse_state_filter(&query.state)?;
    let page = parse_page(&query)?;

    let bookings =
        execute_get_bookings_by_owner(&state.service_deps, owner_id, filter, page).await?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}
