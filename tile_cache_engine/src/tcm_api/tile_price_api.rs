use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::TileManagement,
    db_types::{OrderBookEntry, OrderSide, TileCacheEntry, TilePrice},
    helpers::CollectionRegistry,
    tcm_api::errors::ReconcileError,
};

/// What [`TilePriceApi::reconcile_order`] did with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOutcome {
    /// This order now sets the tile's price.
    Updated,
    /// This order had set the tile's price and is no longer valid, so the price was cleared.
    Retracted,
    /// The tile's price was left as it was.
    Unchanged,
    /// The order's token has no tile in the cache.
    TileNotFound,
    /// The order's contract is not a tracked collection.
    UnknownCollection,
    /// Valid buy orders never contribute to a tile's price.
    BuyOrderNotAggregated,
    /// The tile's price-setting order changed between the read and the write. The order will be looked at again on its
    /// next pass.
    Conflict,
}

/// The change a single order implies for a tile's price fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDecision {
    /// Write `price`, provided the tile's price-setting order is still `expected_setter`.
    Replace { expected_setter: Option<i64>, price: TilePrice },
    /// Clear the price fields, provided this order still sets them.
    Retract,
    Keep,
    IgnoreBuyOrder,
}

/// Works out what `order` means for `tile`.
///
/// A valid sell order takes the price if the tile has none, or if it is strictly cheaper than the current one. Equal
/// prices keep the incumbent. An order that is not valid can only clear a price it set itself.
pub fn decide_price_update(order: &OrderBookEntry, tile: &TileCacheEntry) -> PriceDecision {
    if !order.is_valid() {
        return if tile.is_price_set_by(order.id) { PriceDecision::Retract } else { PriceDecision::Keep };
    }
    if order.side == OrderSide::Buy {
        return PriceDecision::IgnoreBuyOrder;
    }
    let offer = TilePrice::from_order(order);
    match tile.current_price() {
        None => PriceDecision::Replace { expected_setter: tile.lowest_sale_price_order_id, price: offer },
        Some(current) if offer.price < current.price => {
            PriceDecision::Replace { expected_setter: Some(current.order_id), price: offer }
        },
        Some(_) => PriceDecision::Keep,
    }
}

pub struct TilePriceApi<B> {
    db: B,
    collections: CollectionRegistry,
}

impl<B> Debug for TilePriceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TilePriceApi")
    }
}

impl<B> TilePriceApi<B> {
    pub fn new(db: B, collections: CollectionRegistry) -> Self {
        Self { db, collections }
    }
}

impl<B> TilePriceApi<B>
where B: TileManagement
{
    /// Folds one order into its tile's lowest sale price. The order's status must already be up to date.
    ///
    /// Writes are conditional on the tile's price-setting order being the one that was read, so a concurrent writer
    /// can never be silently overwritten. When that condition fails, [`PriceOutcome::Conflict`] is returned and the
    /// tile is left alone.
    pub async fn reconcile_order(&self, order: &OrderBookEntry) -> Result<PriceOutcome, ReconcileError> {
        let Some(collection_id) = self.collections.resolve(&order.nft_contract_address) else {
            return Ok(PriceOutcome::UnknownCollection);
        };
        let Some(tile) =
            self.db.fetch_tile(&collection_id, &order.nft_token_id).await.map_err(ReconcileError::database)?
        else {
            debug!("🧱️ No tile for {collection_id}/{}. Order #{} cannot be priced.", order.nft_token_id, order.id);
            return Ok(PriceOutcome::TileNotFound);
        };
        let outcome = match decide_price_update(order, &tile) {
            PriceDecision::Replace { expected_setter, price } => {
                let applied =
                    self.db.set_tile_price(tile.id, expected_setter, price).await.map_err(ReconcileError::database)?;
                if applied {
                    info!("🧱️ Tile {collection_id}/{} is now listed at {} by order #{}", tile.token_id, price.price, order.id);
                    PriceOutcome::Updated
                } else {
                    PriceOutcome::Conflict
                }
            },
            PriceDecision::Retract => {
                let applied = self.db.clear_tile_price(tile.id, order.id).await.map_err(ReconcileError::database)?;
                if applied {
                    info!("🧱️ Order #{} no longer valid. Price on tile {collection_id}/{} cleared.", order.id, tile.token_id);
                    PriceOutcome::Retracted
                } else {
                    PriceOutcome::Conflict
                }
            },
            PriceDecision::Keep => PriceOutcome::Unchanged,
            PriceDecision::IgnoreBuyOrder => PriceOutcome::BuyOrderNotAggregated,
        };
        if outcome == PriceOutcome::Conflict {
            warn!("🧱️ Tile {collection_id}/{} changed while order #{} was being priced", tile.token_id, order.id);
        }
        Ok(outcome)
    }
}
