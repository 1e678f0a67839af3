use crate::domain::{self, LastNext, StateFilter, commands::*, value_objects::*};
use crate::ports::*;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{BookingApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub booking_store: Arc<dyn BookingStore>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub item_catalog: Arc<dyn ItemCatalog>,
}

/// 物品・予約者スナップショット付きの予約
///
/// エンジンの戻り値。トランスポート層はこれをレスポンスDTOへ写す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub booking: domain::Booking,
    pub item: ItemRef,
    pub booker: UserRef,
}

/// 利用者を解決するヘルパー関数
///
/// # エラー
/// - DirectoryError: ディレクトリ呼び出し失敗
/// - UserNotFound: アカウントが存在しない
async fn resolve_user(deps: &ServiceDependencies, user_id: UserId) -> Result<UserRef> {
    deps.user_directory
        .resolve(user_id)
        .await
        .map_err(BookingApplicationError::DirectoryError)?
        .ok_or(BookingApplicationError::UserNotFound)
}

/// 物品を解決するヘルパー関数
///
/// # エラー
/// - CatalogError: カタログ呼び出し失敗
/// - ItemNotFound: 物品が存在しない
async fn resolve_item(deps: &ServiceDependencies, item_id: ItemId) -> Result<ItemRef> {
    deps.item_catalog
        .resolve(item_id)
        .await
        .map_err(BookingApplicationError::CatalogError)?
        .ok_or(BookingApplicationError::ItemNotFound)
}

/// ストアから予約を取得するヘルパー関数
///
/// # エラー
/// - StoreError: ストア呼び出し失敗
/// - BookingNotFound: 予約が存在しない
async fn load_booking(deps: &ServiceDependencies, booking_id: BookingId) -> Result<domain::Booking> {
    deps.booking_store
        .get_by_id(booking_id)
        .await
        .map_err(BookingApplicationError::StoreError)?
        .ok_or(BookingApplicationError::BookingNotFound)
}

/// 予約をスナップショット付きに引き当てるヘルパー関数
///
/// 参照切れ（物品・予約者が解決できない）は対応するNotFoundとして表面化する。
async fn enrich(deps: &ServiceDependencies, booking: domain::Booking) -> Result<BookingDetails> {
    let item = resolve_item(deps, booking.item_id).await?;
    let booker = resolve_user(deps, booking.booker_id).await?;
    Ok(BookingDetails {
        booking,
        item,
        booker,
    })
}

/// 一覧の各予約を並行で引き当てるヘルパー関数
async fn enrich_all(
    deps: &ServiceDependencies,
    bookings: Vec<domain::Booking>,
) -> Result<Vec<BookingDetails>> {
    try_join_all(bookings.into_iter().map(|b| enrich(deps, b))).await
}

/// 予約を作成する（純粋な関数）
///
/// ビジネスルール：
/// - 予約者が存在すること
/// - 物品が存在すること
/// - 物品が貸出可能であること
/// - 予約者が物品の所有者でないこと
///
/// 所有者による自物品の予約は`ItemNotFound`として失敗する。
/// これは意図的なシグナル再利用：所有者以外が物品の所有関係を
/// 探り当てられないようにする情報秘匿であり、修正しないこと。
///
/// 時間範囲の妥当性（start >= now, end > now, end > start）は
/// 呼び出し層がコマンド構築前に検証する。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 予約作成コマンド
///
/// # 戻り値
/// 採番・永続化済みの予約（スナップショット付き）
pub async fn create_booking(
    deps: &ServiceDependencies,
    cmd: CreateBooking,
) -> Result<BookingDetails> {
    // 1. 予約者の存在確認
    let booker = resolve_user(deps, cmd.booker_id).await?;

    // 2. 物品の存在確認
    let item = resolve_item(deps, cmd.item_id).await?;

    // 3. 貸出可能性の確認
    if !item.available {
        return Err(BookingApplicationError::InvalidRequest(
            "Item is not available for booking".to_string(),
        ));
    }

    // 4. 自物品の予約は所有関係を漏らさないようItemNotFoundで拒否
    if item.owner_id == cmd.booker_id {
        return Err(BookingApplicationError::ItemNotFound);
    }

    // 5. ドメイン層の純粋関数でWaitingのドラフトを生成
    let draft = domain::booking::request_booking(
        cmd.item_id,
        cmd.booker_id,
        cmd.period,
        cmd.requested_at,
    );

    // 6. ストアに保存（採番はストアの責務）
    let booking = deps
        .booking_store
        .insert(draft)
        .await
        .map_err(BookingApplicationError::StoreError)?;

    Ok(BookingDetails {
        booking,
        item,
        booker,
    })
}

/// 予約を承認または却下する（純粋な関数）
///
/// ビジネスルール：
/// - 予約が存在すること
/// - 操作者が物品の所有者であること
/// - 予約がWaiting状態であること（再承認・再却下は不可）
///
/// 決定の書き込みは条件付き（現在のステータスがWaitingの場合のみ更新）。
/// 同一予約への並行承認では片方だけが成功し、負けた側は決定済み予約への
/// 再決定と同じ`InvalidRequest`を観測する。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 決定コマンド
pub async fn approve_booking(
    deps: &ServiceDependencies,
    cmd: DecideBooking,
) -> Result<BookingDetails> {
    // 1. 予約の取得
    let booking = load_booking(deps, cmd.booking_id).await?;

    // 2. 物品の解決（所有者の特定）
    let item = resolve_item(deps, booking.item_id).await?;

    // 3. 所有者のみが決定できる
    if item.owner_id != cmd.acting_user_id {
        return Err(BookingApplicationError::AccessDenied);
    }

    // 4. ドメイン層の純粋関数で状態遷移を検証
    let decided = domain::booking::decide_booking(&booking, cmd.approved, cmd.decided_at)
        .map_err(|_| {
            BookingApplicationError::InvalidRequest(
                "Only waiting bookings can be decided".to_string(),
            )
        })?;

    // 5. 条件付き書き込みで確定（Waitingのままの場合のみ更新される）
    let updated = deps
        .booking_store
        .finalize_status(cmd.booking_id, decided.status, cmd.decided_at)
        .await
        .map_err(BookingApplicationError::StoreError)?
        .ok_or_else(|| {
            // 読み取りと書き込みの間に別の決定が確定した
            BookingApplicationError::InvalidRequest(
                "Only waiting bookings can be decided".to_string(),
            )
        })?;

    let booker = resolve_user(deps, updated.booker_id).await?;
    Ok(BookingDetails {
        booking: updated,
        item,
        booker,
    })
}

/// 予約詳細をIDで取得する（純粋な関数）
///
/// ビジネスルール：
/// - 予約が存在すること
/// - 閲覧者が物品の所有者または予約者であること
///   （それ以外の第三者は他の所有者であってもAccessDenied）
pub async fn get_booking_by_id(
    deps: &ServiceDependencies,
    booking_id: BookingId,
    viewer_id: UserId,
) -> Result<BookingDetails> {
    // 1. 予約の取得
    let booking = load_booking(deps, booking_id).await?;

    // 2. 物品の解決（所有者の特定）
    let item = resolve_item(deps, booking.item_id).await?;

    // 3. 所有者または予約者のみが閲覧できる
    if item.owner_id != viewer_id && booking.booker_id != viewer_id {
        return Err(BookingApplicationError::AccessDenied);
    }

    let booker = resolve_user(deps, booking.booker_id).await?;
    Ok(BookingDetails {
        booking,
        item,
        booker,
    })
}

/// 予約者側の予約一覧を取得する（純粋な関数）
///
/// `now`は呼び出しごとに1回サンプリングし、フィルタ全体で再利用する
/// （1レスポンス内で境界判定が揺れないようにする）。
/// 並び順は開始時刻の降順。
pub async fn get_bookings_by_user(
    deps: &ServiceDependencies,
    user_id: UserId,
    filter: StateFilter,
    page: Page,
) -> Result<Vec<BookingDetails>> {
    // 1. 対象利用者の存在確認
    resolve_user(deps, user_id).await?;

    // 2. 分類時点を固定してセレクションへ変換
    let now = Utc::now();
    let selection = filter.selection(now);

    // 3. ストアで検索（フィルタリングはアダプタ側）
    let bookings = deps
        .booking_store
        .find_by_booker(user_id, &selection, page)
        .await
        .map_err(BookingApplicationError::StoreError)?;

    enrich_all(deps, bookings).await
}

/// 所有者側の予約一覧を取得する（純粋な関数）
///
/// 所有物品のID集合でスコープする。物品を持たない所有者には
/// 空の一覧を返す（管理すべき予約が存在しないだけで、エラーではない）。
pub async fn get_bookings_by_owner(
    deps: &ServiceDependencies,
    owner_id: UserId,
    filter: StateFilter,
    page: Page,
) -> Result<Vec<BookingDetails>> {
    // 1. 対象所有者の存在確認
    resolve_user(deps, owner_id).await?;

    // 2. 所有物品のスコープ決定
    let item_ids = deps
        .item_catalog
        .list_item_ids_by_owner(owner_id)
        .await
        .map_err(BookingApplicationError::CatalogError)?;

    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    // 3. 分類時点を固定してセレクションへ変換
    let now = Utc::now();
    let selection = filter.selection(now);

    // 4. ストアで検索
    let bookings = deps
        .booking_store
        .find_by_items(&item_ids, &selection, page)
        .await
        .map_err(BookingApplicationError::StoreError)?;

    enrich_all(deps, bookings).await
}

/// 物品詳細向けに直前・直後の予約を分類する（純粋な関数）
///
/// Waitingの予約を除外して、終了がnowより厳密に前で最も遅い予約（last）と
/// 開始がnowより厳密に後で最も早い予約（next）を返す。
/// 未承認のリクエストを確定済みの予約として表示しないための除外。
/// 物品コンポーネント（外部）が所有者向け物品詳細の組み立てに使用する。
pub async fn classify_last_next(
    deps: &ServiceDependencies,
    item_id: ItemId,
) -> Result<LastNext> {
    let bookings = deps
        .booking_store
        .find_by_item_excluding_status(item_id, BookingStatus::Waiting)
        .await
        .map_err(BookingApplicationError::StoreError)?;

    let now = Utc::now();
    let (last, next) = domain::classifier::pick_last_next(&bookings, now);

    Ok(LastNext {
        last: last.cloned(),
        next: next.cloned(),
    })
}

/// 物品ID集合に対する直前・直後の予約を一括分類する（純粋な関数）
///
/// ストアへの問い合わせは1回（非ページの集約クエリ）。
/// 要求されたすべてのIDがエントリを持ち、予約のない物品は空のLastNextになる。
pub async fn classify_last_next_batch(
    deps: &ServiceDependencies,
    item_ids: &[ItemId],
) -> Result<HashMap<ItemId, LastNext>> {
    let bookings = deps
        .booking_store
        .find_by_items_excluding_status(item_ids, BookingStatus::Waiting)
        .await
        .map_err(BookingApplicationError::StoreError)?;

    let now = Utc::now();

    let mut by_item: HashMap<ItemId, Vec<domain::Booking>> = HashMap::new();
    for booking in bookings {
        by_item.entry(booking.item_id).or_default().push(booking);
    }

    let mut classified = HashMap::with_capacity(item_ids.len());
    for &item_id in item_ids {
        let item_bookings = by_item.remove(&item_id).unwrap_or_default();
        let (last, next) = domain::classifier::pick_last_next(&item_bookings, now);
        classified.insert(
            item_id,
            LastNext {
                last: last.cloned(),
                next: next.cloned(),
            },
        );
    }

    Ok(classified)
}

/// 利用者が物品の利用を完了した予約を持つか（純粋な関数）
///
/// `as_of`より前に終了した予約の存在確認。コメントコンポーネント（外部）が
/// 投稿資格の判定に使用する。ステータスでは絞らない。
pub async fn has_completed_booking(
    deps: &ServiceDependencies,
    user_id: UserId,
    item_id: ItemId,
    as_of: DateTime<Utc>,
) -> Result<bool> {
    deps.booking_store
        .has_completed_booking(user_id, item_id, as_of)
        .await
        .map_err(BookingApplicationError::StoreError)
}
