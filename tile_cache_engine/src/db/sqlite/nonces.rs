use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::Nonce};

pub async fn is_revoked(nonce: &Nonce, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM revoked_nonces WHERE nonce = $1 LIMIT 1")
        .bind(nonce)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Revocations are append-only facts, so recording the same nonce twice is a no-op. Returns true if the nonce was
/// newly recorded.
pub async fn revoke(nonce: &Nonce, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query("INSERT INTO revoked_nonces (nonce) VALUES ($1) ON CONFLICT (nonce) DO NOTHING")
        .bind(nonce)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
