use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use log::warn;
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, Row, SqliteConnection};

use super::{from_millis, is_decode_error, to_millis};
use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOwnershipBalance, OwnershipBalance, TokenId},
};

impl<'r> FromRow<'r, SqliteRow> for OwnershipBalance {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let Json(token_ids) = row.try_get::<Json<BTreeSet<TokenId>>, _>("token_ids")?;
        Ok(Self {
            id: row.try_get("id")?,
            contract_address: row.try_get("contract_address")?,
            account_address: row.try_get("account_address")?,
            token_ids,
            last_reconciled_at: from_millis(row.try_get("last_reconciled_at")?),
        })
    }
}

/// Creates or replaces the balance for the (contract, account) pair. A replaced balance is made stale so that the new
/// token set is picked up on the next pass.
pub async fn upsert_balance(
    balance: NewOwnershipBalance,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO erc721_balances (contract_address, account_address, token_ids) VALUES ($1, $2, $3)
            ON CONFLICT (contract_address, account_address)
            DO UPDATE SET token_ids = excluded.token_ids, last_reconciled_at = NULL
            RETURNING id;
        "#,
    )
    .bind(balance.contract_address)
    .bind(balance.account_address)
    .bind(Json(balance.token_ids))
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Returns one balance that owns at least one token and whose `last_reconciled_at` is absent or older than
/// `stale_before`.
///
/// Rows whose `token_ids` is not valid JSON never qualify. Rows that are valid JSON but do not hold a list of token
/// ids are logged and stamped as reconciled, so that they do not hold up the other stale balances.
pub async fn fetch_next_stale_balance(
    stale_before: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<OwnershipBalance>, SqliteDatabaseError> {
    loop {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM erc721_balances
            WHERE CASE WHEN json_valid(token_ids) THEN json_array_length(token_ids) ELSE 0 END > 0
              AND (last_reconciled_at IS NULL OR last_reconciled_at < $1)
            ORDER BY last_reconciled_at IS NOT NULL, last_reconciled_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(to_millis(stale_before))
        .fetch_optional(&mut *conn)
        .await?;
        let Some(id) = id else {
            return Ok(None);
        };
        match fetch_balance(id, &mut *conn).await {
            Ok(balance) => return Ok(balance),
            Err(SqliteDatabaseError::DriverError(e)) if is_decode_error(&e) => {
                warn!("🪪️ Balance #{id} could not be decoded and will be skipped until it is stale again. {e}");
                mark_reconciled(id, Utc::now(), &mut *conn).await?;
            },
            Err(e) => return Err(e),
        }
    }
}

pub async fn fetch_balance(id: i64, conn: &mut SqliteConnection) -> Result<Option<OwnershipBalance>, SqliteDatabaseError> {
    let balance = sqlx::query_as(
        "SELECT id, contract_address, account_address, token_ids, last_reconciled_at FROM erc721_balances WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}

pub async fn mark_reconciled(id: i64, at: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    let _ = sqlx::query("UPDATE erc721_balances SET last_reconciled_at = $1 WHERE id = $2")
        .bind(to_millis(at))
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
