use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{CollectionId, NewTileCacheEntry, TileCacheEntry, TilePrice, TokenId},
};

impl<'r> FromRow<'r, SqliteRow> for TileCacheEntry {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            collection_id: row.try_get("collection_id")?,
            token_id: row.try_get("token_id")?,
            owner_address: row.try_get("owner_address")?,
            lowest_sale_price: row.try_get("lowest_sale_price")?,
            lowest_sale_price_order_id: row.try_get("lowest_sale_price_order_id")?,
            price_sort_key: row.try_get("price_sort_key")?,
        })
    }
}

pub async fn fetch_tile(
    collection_id: &CollectionId,
    token_id: &TokenId,
    conn: &mut SqliteConnection,
) -> Result<Option<TileCacheEntry>, SqliteDatabaseError> {
    let tile = sqlx::query_as(
        r#"
            SELECT
                id,
                collection_id,
                token_id,
                owner_address,
                lowest_sale_price,
                lowest_sale_price_order_id,
                price_sort_key
            FROM nft_tiles
            WHERE collection_id = $1 AND token_id = $2
        "#,
    )
    .bind(collection_id)
    .bind(token_id)
    .fetch_optional(conn)
    .await?;
    Ok(tile)
}

/// Inserts the tile, unless one already exists for the same (collection, token). Either way, the tile's id is returned.
pub async fn idempotent_insert(tile: NewTileCacheEntry, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    if let Some(existing) = fetch_tile(&tile.collection_id, &tile.token_id, &mut *conn).await? {
        debug!("🧱️ Tile {}/{} already exists with id {}", tile.collection_id, tile.token_id, existing.id);
        return Ok(existing.id);
    }
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO nft_tiles (collection_id, token_id, owner_address) VALUES ($1, $2, $3)
            RETURNING id;
        "#,
    )
    .bind(tile.collection_id)
    .bind(tile.token_id)
    .bind(tile.owner_address)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Compare-and-set of the three price fields. `IS` rather than `=` so that a `NULL` expected setter matches a tile
/// with no price-setting order.
pub async fn set_price(
    tile_id: i64,
    expected_setter: Option<i64>,
    price: TilePrice,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            UPDATE nft_tiles
            SET lowest_sale_price = $1, lowest_sale_price_order_id = $2, price_sort_key = $3
            WHERE id = $4 AND lowest_sale_price_order_id IS $5
        "#,
    )
    .bind(price.price)
    .bind(price.order_id)
    .bind(price.sort_key())
    .bind(tile_id)
    .bind(expected_setter)
    .execute(conn)
    .await?;
    trace!("🧱️ set_price on tile {tile_id}: {} rows affected", result.rows_affected());
    Ok(result.rows_affected() > 0)
}

pub async fn clear_price(tile_id: i64, order_id: i64, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            UPDATE nft_tiles
            SET lowest_sale_price = NULL, lowest_sale_price_order_id = NULL, price_sort_key = NULL
            WHERE id = $1 AND lowest_sale_price_order_id = $2
        "#,
    )
    .bind(tile_id)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_owner(tile_id: i64, owner_address: &str, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    let _ = sqlx::query("UPDATE nft_tiles SET owner_address = $1 WHERE id = $2")
        .bind(owner_address)
        .bind(tile_id)
        .execute(conn)
        .await?;
    Ok(())
}
