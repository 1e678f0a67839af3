use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use rusty_sharing_ddd::adapters::mock::{BookingStore, ItemCatalog, UserDirectory};
use rusty_sharing_ddd::api::handlers::AppState;
use rusty_sharing_ddd::api::router::create_router;
use rusty_sharing_ddd::application::booking::ServiceDependencies;
use rusty_sharing_ddd::domain::value_objects::{ItemId, UserId};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// E2Eテスト用のアプリケーションセットアップ
///
/// 実際のAPIルーターとインメモリアダプターを使用する。
/// 外部コラボレーター（利用者・物品）はモックから注入する。
fn setup_app() -> (Router, Arc<UserDirectory>, Arc<ItemCatalog>) {
    let user_directory = Arc::new(UserDirectory::new());
    let item_catalog = Arc::new(ItemCatalog::new());

    let service_deps = ServiceDependencies {
        booking_store: Arc::new(BookingStore::new()),
        user_directory: user_directory.clone(),
        item_catalog: item_catalog.clone(),
    };

    let app_state = Arc::new(AppState { service_deps });

    (create_router(app_state), user_directory, item_catalog)
}

/// テスト用の所有者・予約者・物品をセットアップ
fn setup_test_entities(
    user_directory: &UserDirectory,
    item_catalog: &ItemCatalog,
) -> (UserId, UserId, ItemId) {
    let owner_id = UserId::from_i64(1);
    let booker_id = UserId::from_i64(2);
    let item_id = ItemId::from_i64(100);

    user_directory.add_user(owner_id);
    user_directory.add_user(booker_id);
    item_catalog.add_item(item_id, owner_id, true);

    (owner_id, booker_id, item_id)
}

/// リクエストを送ってステータスとJSONボディを取り出す
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_booking(booker_id: UserId, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/bookings")
        .header("content-type", "application/json")
        .header("x-user-id", booker_id.value())
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch_decision(booking_id: i64, approved: bool, acting: UserId) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(format!("/bookings/{}?approved={}", booking_id, approved))
        .header("x-user-id", acting.value())
        .body(Body::empty())
        .unwrap()
}

fn get_path(path: &str, viewer: UserId) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("x-user-id", viewer.value())
        .body(Body::empty())
        .unwrap()
}

/// 有効な予約ボディ（now+1h 〜 now+2h）
fn valid_booking_body(item_id: ItemId) -> Value {
    let now = Utc::now();
    json!({
        "item_id": item_id.value(),
        "start": (now + Duration::hours(1)).to_rfc3339(),
        "end": (now + Duration::hours(2)).to_rfc3339(),
    })
}

// ============================================================================
// E2Eテスト
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = setup_app();

    let response = app
        .oneshot(get_path("/health", UserId::from_i64(1)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_booking_returns_201_with_waiting_status() {
    let (app, user_directory, item_catalog) = setup_app();
    let (owner_id, booker_id, item_id) = setup_test_entities(&user_directory, &item_catalog);

    let (status, body) = send(&app, post_booking(booker_id, valid_booking_body(item_id))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "waiting");
    assert_eq!(body["item"]["item_id"], item_id.value());
    assert_eq!(body["item"]["owner_id"], owner_id.value());
    assert_eq!(body["booker"]["user_id"], booker_id.value());
    assert!(body["booking_id"].as_i64().is_some());
}

#[tokio::test]
async fn test_create_booking_requires_user_header() {
    let (app, user_directory, item_catalog) = setup_app();
    let (_, _, item_id) = setup_test_entities(&user_directory, &item_catalog);

    let request = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header("content-type", "application/json")
        .body(Body::from(valid_booking_body(item_id).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_create_booking_rejects_past_start() {
    let (app, user_directory, item_catalog) = setup_app();
    let (_, booker_id, item_id) = setup_test_entities(&user_directory, &item_catalog);

    let now = Utc::now();
    let body = json!({
        "item_id": item_id.value(),
        "start": (now - Duration::hours(1)).to_rfc3339(),
        "end": (now + Duration::hours(1)).to_rfc3339(),
    });

    let (status, _) = send(&app, post_booking(booker_id, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_rejects_end_not_after_start() {
    let (app, user_directory, item_catalog) = setup_app();
    let (_, booker_id, item_id) = setup_test_entities(&user_directory, &item_catalog);

    let now = Utc::now();
    let start = now + Duration::hours(2);
    let body = json!({
        "item_id": item_id.value(),
        "start": start.to_rfc3339(),
        "end": start.to_rfc3339(),
    });

    let (status, _) = send(&app, post_booking(booker_id, body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_unknown_item_returns_404() {
    let (app, user_directory, item_catalog) = setup_app();
    let (_, booker_id, _) = setup_test_entities(&user_directory, &item_catalog);

    let (status, body) = send(
        &app,
        post_booking(booker_id, valid_booking_body(ItemId::from_i64(999))),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ITEM_NOT_FOUND");
}

/// 自物品の予約は所有関係を漏らさないよう404（ITEM_NOT_FOUND）になる
#[tokio::test]
async fn test_create_booking_own_item_returns_404() {
    let (app, user_directory, item_catalog) = setup_app();
    let (owner_id, _, item_id) = setup_test_entities(&user_directory, &item_catalog);

    let (status, body) = send(&app, post_booking(owner_id, valid_booking_body(item_id))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ITEM_NOT_FOUND");
}

/// 作成 → 承認 → 閲覧の一連のフロー
#[tokio::test]
async fn test_full_booking_flow() {
    let (app, user_directory, item_catalog) = setup_app();
    let (owner_id, booker_id, item_id) = setup_test_entities(&user_directory, &item_catalog);
    let third_party = UserId::from_i64(3);
    user_directory.add_user(third_party);

    // 作成
    let (status, created) =
        send(&app, post_booking(booker_id, valid_booking_body(item_id))).await;
    assert_eq!(status, StatusCode::CREATED);
    let booking_id = created["booking_id"].as_i64().unwrap();

    // 予約者による承認は403
    let (status, _) = send(&app, patch_decision(booking_id, true, booker_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 所有者による承認は200
    let (status, approved) = send(&app, patch_decision(booking_id, true, owner_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    // 再承認は400（決定は1回のみ）
    let (status, _) = send(&app, patch_decision(booking_id, false, owner_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 予約者・所有者は閲覧できる
    let path = format!("/bookings/{}", booking_id);
    let (status, _) = send(&app, get_path(&path, booker_id)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get_path(&path, owner_id)).await;
    assert_eq!(status, StatusCode::OK);

    // 第三者の閲覧は403
    let (status, body) = send(&app, get_path(&path, third_party)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "ACCESS_DENIED");
}

#[tokio::test]
async fn test_list_bookings_with_state_filter() {
    let (app, user_directory, item_catalog) = setup_app();
    let (owner_id, booker_id, item_id) = setup_test_entities(&user_directory, &item_catalog);

    let (status, _) = send(&app, post_booking(booker_id, valid_booking_body(item_id))).await;
    assert_eq!(status, StatusCode::CREATED);

    // 予約者側：FUTUREとWAITINGに現れる
    for state in ["FUTURE", "WAITING", "ALL"] {
        let path = format!("/bookings?state={}", state);
        let (status, body) = send(&app, get_path(&path, booker_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1, "state={}", state);
    }

    // CURRENTには現れない
    let (status, body) = send(&app, get_path("/bookings?state=CURRENT", booker_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    // 所有者側の一覧にも現れる
    let (status, body) = send(&app, get_path("/bookings/owner", owner_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

/// 未知のステートフィルタはALLへフォールバックせず400になる
#[tokio::test]
async fn test_list_bookings_unknown_state_returns_400() {
    let (app, user_directory, item_catalog) = setup_app();
    let (_, booker_id, _) = setup_test_entities(&user_directory, &item_catalog);

    let (status, body) = send(&app, get_path("/bookings?state=SOMETIME", booker_id)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_list_bookings_rejects_bad_page() {
    let (app, user_directory, item_catalog) = setup_app();
    let (_, booker_id, _) = setup_test_entities(&user_directory, &item_catalog);

    let (status, _) = send(&app, get_path("/bookings?from=-1", booker_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get_path("/bookings?size=0", booker_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// 物品を持たない所有者の一覧は200で空
#[tokio::test]
async fn test_owner_without_items_gets_empty_list() {
    let (app, user_directory, item_catalog) = setup_app();
    setup_test_entities(&user_directory, &item_catalog);
    let itemless = UserId::from_i64(42);
    user_directory.add_user(itemless);

    let (status, body) = send(&app, get_path("/bookings/owner", itemless)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_user_listing_returns_404() {
    let (app, user_directory, item_catalog) = setup_app();
    setup_test_entities(&user_directory, &item_catalog);

    let (status, body) = send(&app, get_path("/bookings", UserId::from_i64(999))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "USER_NOT_FOUND");
}
