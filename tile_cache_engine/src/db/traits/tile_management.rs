use super::TileCacheDatabase;
use crate::db_types::{CollectionId, TileCacheEntry, TilePrice, TokenId};

/// Reads and single-record writes against the tile cache.
///
/// The order path only ever writes the three price fields, and the balance path only ever writes the owner field, so
/// the two can run concurrently against the same tile.
#[allow(async_fn_in_trait)]
pub trait TileManagement: TileCacheDatabase {
    async fn fetch_tile(
        &self,
        collection_id: &CollectionId,
        token_id: &TokenId,
    ) -> Result<Option<TileCacheEntry>, Self::Error>;

    /// Writes `lowest_sale_price`, `lowest_sale_price_order_id` and `price_sort_key` from `price`, but only if the
    /// tile's price-setting order is still `expected_setter` (`None` meaning "no setter"). Returns whether the write
    /// was applied.
    async fn set_tile_price(
        &self,
        tile_id: i64,
        expected_setter: Option<i64>,
        price: TilePrice,
    ) -> Result<bool, Self::Error>;

    /// Clears all three price fields, but only if `order_id` is still the tile's price-setting order. Returns whether
    /// anything was cleared.
    async fn clear_tile_price(&self, tile_id: i64, order_id: i64) -> Result<bool, Self::Error>;

    async fn update_tile_owner(&self, tile_id: i64, owner_address: &str) -> Result<(), Self::Error>;
}
