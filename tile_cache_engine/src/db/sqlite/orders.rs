use chrono::{DateTime, Utc};
use log::{trace, warn};
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use super::{from_millis, is_decode_error, to_millis};
use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{status_from_column, NewOrderBookEntry, OrderBookEntry, OrderSide, OrderStatus},
};

const ORDER_COLUMNS: &str = r#"
    id,
    nft_contract_address,
    nft_token_id,
    order_creator,
    is_sell_order,
    currency_token_amount,
    expires_at_block,
    nonce,
    status,
    last_reconciled_at
"#;

impl<'r> FromRow<'r, SqliteRow> for OrderBookEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            nft_contract_address: row.try_get("nft_contract_address")?,
            nft_token_id: row.try_get("nft_token_id")?,
            order_creator: row.try_get("order_creator")?,
            side: OrderSide::from_is_sell_order(row.try_get("is_sell_order")?),
            currency_token_amount: row.try_get("currency_token_amount")?,
            expires_at_block: row.try_get("expires_at_block")?,
            nonce: row.try_get("nonce")?,
            status: status_from_column(row.try_get("status")?),
            last_reconciled_at: from_millis(row.try_get("last_reconciled_at")?),
        })
    }
}

/// Inserts a new order into the database using the given connection.
pub async fn insert_order(order: NewOrderBookEntry, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO order_book (
                nft_contract_address,
                nft_token_id,
                order_creator,
                is_sell_order,
                currency_token_amount,
                expires_at_block,
                nonce
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id;
        "#,
    )
    .bind(order.nft_contract_address)
    .bind(order.nft_token_id)
    .bind(order.order_creator)
    .bind(order.side.is_sell())
    .bind(order.currency_token_amount)
    .bind(order.expires_at_block)
    .bind(order.nonce)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<OrderBookEntry>, SqliteDatabaseError> {
    let order = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM order_book WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Returns one order whose `last_reconciled_at` is absent or older than `stale_before`. Orders that have never been
/// reconciled come first, then the stalest.
///
/// A row that cannot be decoded is logged and stamped as reconciled, so that it does not hold up every other stale
/// order. It comes round again after the staleness window, by which time its writer may have repaired it.
pub async fn fetch_next_stale_order(
    stale_before: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderBookEntry>, SqliteDatabaseError> {
    loop {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM order_book
            WHERE last_reconciled_at IS NULL OR last_reconciled_at < $1
            ORDER BY last_reconciled_at IS NOT NULL, last_reconciled_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(to_millis(stale_before))
        .fetch_optional(&mut *conn)
        .await?;
        let Some(id) = id else {
            trace!("📝️ No stale orders");
            return Ok(None);
        };
        match fetch_order(id, &mut *conn).await {
            Ok(order) => {
                trace!("📝️ Next stale order: #{id}");
                return Ok(order);
            },
            Err(SqliteDatabaseError::DriverError(e)) if is_decode_error(&e) => {
                warn!("📝️ Order #{id} could not be decoded and will be skipped until it is stale again. {e}");
                mark_reconciled(id, Utc::now(), &mut *conn).await?;
            },
            Err(e) => return Err(e),
        }
    }
}

pub async fn update_order_status(
    id: i64,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let _ = sqlx::query("UPDATE order_book SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn mark_reconciled(id: i64, at: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    let _ = sqlx::query("UPDATE order_book SET last_reconciled_at = $1 WHERE id = $2")
        .bind(to_millis(at))
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
