use chrono::Utc;
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use super::{from_millis, to_millis};
use crate::{db::sqlite::SqliteDatabaseError, db_types::ProcessState};

/// The process state table holds a single row with this id.
const PROCESS_STATE_ID: i64 = 1;

impl<'r> FromRow<'r, SqliteRow> for ProcessState {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let updated_at = from_millis(Some(row.try_get("updated_at")?))
            .ok_or_else(|| sqlx::Error::Decode("process_state.updated_at is out of range".into()))?;
        Ok(Self { latest_block_height: row.try_get("latest_block_height")?, updated_at })
    }
}

pub async fn upsert_latest_block_height(height: i64, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    let _ = sqlx::query(
        r#"
            INSERT INTO process_state (id, latest_block_height, updated_at) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                latest_block_height = excluded.latest_block_height,
                updated_at = excluded.updated_at
        "#,
    )
    .bind(PROCESS_STATE_ID)
    .bind(height)
    .bind(to_millis(Utc::now()))
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_process_state(conn: &mut SqliteConnection) -> Result<Option<ProcessState>, SqliteDatabaseError> {
    let state = sqlx::query_as("SELECT latest_block_height, updated_at FROM process_state WHERE id = $1")
        .bind(PROCESS_STATE_ID)
        .fetch_optional(conn)
        .await?;
    Ok(state)
}
