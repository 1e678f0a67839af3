use crate::domain::{
    Booking, BookingDraft, BookingSelection,
    value_objects::{BookingId, BookingPeriod, BookingStatus, ItemId, Page, UserId},
};
use crate::ports::booking_store::{BookingStore as BookingStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// SELECT句（全クエリ共通の列リスト）
const SELECT_COLUMNS: &str = r#"
    SELECT
        booking_id,
        item_id,
        booker_id,
        start_at,
        end_at,
        status,
        created_at,
        updated_at
    FROM bookings
"#;

fn invalid_data(msg: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
}

/// PostgreSQLの行データをBookingに変換する
///
/// statusの文字列からの変換と、start/endの期間不変条件の再検証で
/// エラーハンドリングを行う（CHECK制約を信頼しつつ防壁は残す）。
fn map_row_to_booking(row: &PgRow) -> Result<Booking> {
    let status_str: &str = row.get("status");
    let status = BookingStatus::from_str(status_str).map_err(invalid_data)?;

    let period = BookingPeriod::new(row.get("start_at"), row.get("end_at"))
        .map_err(|e| invalid_data(format!("Invalid booking period in row: {:?}", e)))?;

    Ok(Booking {
        booking_id: BookingId::from_i64(row.get("booking_id")),
        item_id: ItemId::from_i64(row.get("item_id")),
        booker_id: UserId::from_i64(row.get("booker_id")),
        period,
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// BookingStoreのPostgreSQL実装
///
/// セレクションの各バリアントは対応するWHERE句へ変換される。
/// インメモリ実装が解釈する`BookingSelection::matches`と同じ意味を
/// SQL側で表現する。
#[allow(dead_code)]
pub struct BookingStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl BookingStore {
    /// PostgreSQLコネクションプールから新しいBookingStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStoreTrait for BookingStore {
    /// ドラフトを挿入し、BIGSERIALで採番された行を返す
    async fn insert(&self, draft: BookingDraft) -> Result<Booking> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (
                item_id,
                booker_id,
                start_at,
                end_at,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                booking_id,
                item_id,
                booker_id,
                start_at,
                end_at,
                status,
                created_at,
                updated_at
            "#,
        )
        .bind(draft.item_id.value())
        .bind(draft.booker_id.value())
        .bind(draft.period.start())
        .bind(draft.period.end())
        .bind(draft.status.as_str())
        .bind(draft.created_at)
        .bind(draft.updated_at)
        .fetch_one(&self.pool)
        .await?;

        map_row_to_booking(&row)
    }

    /// IDで予約を取得
    async fn get_by_id(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let sql = format!("{SELECT_COLUMNS} WHERE booking_id = $1");
        let row = sqlx::query(&sql)
            .bind(booking_id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    /// ステータスの条件付き確定
    ///
    /// WHERE句でWaitingを要求する1文のUPDATE。並行する決定のうち
    /// 片方だけが行を更新し、負けた側は0行（None）を観測する。
    async fn finalize_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = $3
            WHERE booking_id = $1 AND status = 'waiting'
            RETURNING
                booking_id,
                item_id,
                booker_id,
                start_at,
                end_at,
                status,
                created_at,
                updated_at
            "#,
        )
        .bind(booking_id.value())
        .bind(status.as_str())
        .bind(decided_at)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_booking).transpose()
    }

    /// 予約者の予約をセレクション付きで検索（開始時刻の降順）
    ///
    /// (booker_id, start_at DESC)のインデックスを使用する。
    async fn find_by_booker(
        &self,
        booker_id: UserId,
        selection: &BookingSelection,
        page: Page,
    ) -> Result<Vec<Booking>> {
        let order = "ORDER BY start_at DESC LIMIT $2 OFFSET $3";
        let rows = match *selection {
            BookingSelection::All => {
                let sql = format!("{SELECT_COLUMNS} WHERE booker_id = $1 {order}");
                sqlx::query(&sql)
                    .bind(booker_id.value())
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::InProgressAt(t) => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE booker_id = $1 AND start_at <= $4 AND end_at > $4 {order}"
                );
                sqlx::query(&sql)
                    .bind(booker_id.value())
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::EndedBefore(t) => {
                let sql = format!("{SELECT_COLUMNS} WHERE booker_id = $1 AND end_at < $4 {order}");
                sqlx::query(&sql)
                    .bind(booker_id.value())
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::StartsAfter(t) => {
                let sql = format!("{SELECT_COLUMNS} WHERE booker_id = $1 AND start_at > $4 {order}");
                sqlx::query(&sql)
                    .bind(booker_id.value())
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::WithStatus(status) => {
                let sql = format!("{SELECT_COLUMNS} WHERE booker_id = $1 AND status = $4 {order}");
                sqlx::query(&sql)
                    .bind(booker_id.value())
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(map_row_to_booking).collect()
    }

    /// 物品ID集合に対する予約をセレクション付きで検索（開始時刻の降順）
    async fn find_by_items(
        &self,
        item_ids: &[ItemId],
        selection: &BookingSelection,
        page: Page,
    ) -> Result<Vec<Booking>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();
        let order = "ORDER BY start_at DESC LIMIT $2 OFFSET $3";
        let rows = match *selection {
            BookingSelection::All => {
                let sql = format!("{SELECT_COLUMNS} WHERE item_id = ANY($1) {order}");
                sqlx::query(&sql)
                    .bind(&ids)
                    .bind(page.limit())
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::InProgressAt(t) => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE item_id = ANY($1) AND start_at <= $4 AND end_at > $4 {order}"
                );
                sqlx::query(&sql)
                    .bind(&ids)
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::EndedBefore(t) => {
                let sql =
                    format!("{SELECT_COLUMNS} WHERE item_id = ANY($1) AND end_at < $4 {order}");
                sqlx::query(&sql)
                    .bind(&ids)
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::StartsAfter(t) => {
                let sql =
                    format!("{SELECT_COLUMNS} WHERE item_id = ANY($1) AND start_at > $4 {order}");
                sqlx::query(&sql)
                    .bind(&ids)
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookingSelection::WithStatus(status) => {
                let sql =
                    format!("{SELECT_COLUMNS} WHERE item_id = ANY($1) AND status = $4 {order}");
                sqlx::query(&sql)
                    .bind(&ids)
                    .bind(page.limit())
                    .bind(page.offset())
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter().map(map_row_to_booking).collect()
    }

    /// 指定ステータスを除外して物品の予約を検索（開始時刻の昇順）
    ///
    /// 直前・直後の分類用。(item_id, start_at)のインデックスを使用する。
    async fn find_by_item_excluding_status(
        &self,
        item_id: ItemId,
        excluded: BookingStatus,
    ) -> Result<Vec<Booking>> {
        let sql = format!("{SELECT_COLUMNS} WHERE item_id = $1 AND status <> $2 ORDER BY start_at ASC");
        let rows = sqlx::query(&sql)
            .bind(item_id.value())
            .bind(excluded.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_booking).collect()
    }

    /// 指定ステータスを除外して物品ID集合の予約を検索（開始時刻の昇順）
    async fn find_by_items_excluding_status(
        &self,
        item_ids: &[ItemId],
        excluded: BookingStatus,
    ) -> Result<Vec<Booking>> {
        let ids: Vec<i64> = item_ids.iter().map(|id| id.value()).collect();
        let sql =
            format!("{SELECT_COLUMNS} WHERE item_id = ANY($1) AND status <> $2 ORDER BY start_at ASC");
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .bind(excluded.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_booking).collect()
    }

    /// 完了済み予約の存在確認
    async fn has_completed_booking(
        &self,
        booker_id: UserId,
        item_id: ItemId,
        end_before: DateTime<Utc>,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM bookings
                WHERE booker_id = $1 AND item_id = $2 AND end_at < $3
            )
            "#,
        )
        .bind(booker_id.value())
        .bind(item_id.value())
        .bind(end_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
