use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{OrderBookManagement, TileManagement},
    db_types::{OrderBookEntry, OrderStatus, TileCacheEntry},
    helpers::{same_address, CollectionRegistry},
    tcm_api::errors::ReconcileError,
};

/// What [`OrderValidationApi::validate_order`] did with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The status was computed and persisted.
    Updated(OrderStatus),
    /// The order's contract is not a tracked collection. Nothing was written.
    SkippedUnknownCollection,
    /// No block height has been observed yet. Nothing was written.
    SkippedNoBlockHeight,
}

/// Computes the status of an order. Rules are applied in order and the last one to match wins, so a revoked nonce
/// outranks expiry, which outranks an owner mismatch.
///
/// * The owner check applies to sell orders only, and only when `tile` is known and has a non-blank owner.
/// * An order expires once the block height has moved strictly past `expires_at_block`.
pub fn compute_order_status(
    order: &OrderBookEntry,
    block_height: i64,
    tile: Option<&TileCacheEntry>,
    nonce_revoked: bool,
) -> OrderStatus {
    let mut status = OrderStatus::Valid;
    let owner_mismatch = order.side.is_sell() &&
        tile.and_then(|t| t.known_owner()).is_some_and(|owner| !same_address(owner, &order.order_creator));
    if owner_mismatch {
        status = OrderStatus::OwnerAddressMismatched;
    }
    if order.expires_at_block < block_height {
        status = OrderStatus::OrderExpired;
    }
    if nonce_revoked {
        status = OrderStatus::NonceBurned;
    }
    status
}

pub struct OrderValidationApi<B> {
    db: B,
    collections: CollectionRegistry,
}

impl<B> Debug for OrderValidationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderValidationApi ({} collections)", self.collections.len())
    }
}

impl<B> OrderValidationApi<B> {
    pub fn new(db: B, collections: CollectionRegistry) -> Self {
        Self { db, collections }
    }
}

impl<B> OrderValidationApi<B>
where B: OrderBookManagement + TileManagement
{
    /// Validates a single order against `block_height` and persists the resulting status.
    ///
    /// Orders for unknown collections are skipped, as is every order while no block height is available. The order's
    /// `last_reconciled_at` is not touched here.
    pub async fn validate_order(
        &self,
        order: &OrderBookEntry,
        block_height: Option<i64>,
    ) -> Result<ValidationOutcome, ReconcileError> {
        let Some(collection_id) = self.collections.resolve(&order.nft_contract_address) else {
            debug!("📝️ Order #{} is for untracked contract {}. Skipping.", order.id, order.nft_contract_address);
            return Ok(ValidationOutcome::SkippedUnknownCollection);
        };
        let Some(block_height) = block_height else {
            warn!("📝️ Cannot validate order #{} because no block height has been observed yet", order.id);
            return Ok(ValidationOutcome::SkippedNoBlockHeight);
        };
        let tile = self.db.fetch_tile(&collection_id, &order.nft_token_id).await.map_err(ReconcileError::database)?;
        let nonce_revoked = self.db.is_nonce_revoked(&order.nonce).await.map_err(ReconcileError::database)?;
        let status = compute_order_status(order, block_height, tile.as_ref(), nonce_revoked);
        if order.status != Some(status) {
            self.db.update_order_status(order.id, status).await.map_err(ReconcileError::database)?;
            debug!(
                "📝️ Order #{} status changed from {} to {status} at block {block_height}",
                order.id,
                order.status.map(|s| s.to_string()).unwrap_or_else(|| "unvalidated".into())
            );
        }
        Ok(ValidationOutcome::Updated(status))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::{OrderSide, WeiAmount};

    const SELLER: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn order(side: OrderSide, expires_at_block: i64) -> OrderBookEntry {
        OrderBookEntry {
            id: 1,
            nft_contract_address: "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".into(),
            nft_token_id: "7".into(),
            order_creator: SELLER.into(),
            side,
            currency_token_amount: WeiAmount::from(100u64),
            expires_at_block,
            nonce: "n1".into(),
            status: None,
            last_reconciled_at: None,
        }
    }

    fn tile(owner: Option<&str>) -> TileCacheEntry {
        TileCacheEntry {
            id: 1,
            collection_id: "tiles".into(),
            token_id: "7".into(),
            owner_address: owner.map(String::from),
            lowest_sale_price: None,
            lowest_sale_price_order_id: None,
            price_sort_key: None,
        }
    }

    #[test]
    fn valid_when_nothing_applies() {
        let o = order(OrderSide::Sell, 100);
        assert_eq!(compute_order_status(&o, 50, Some(&tile(Some(SELLER))), false), OrderStatus::Valid);
        // Owner comparison ignores case
        let lower = SELLER.to_lowercase();
        assert_eq!(compute_order_status(&o, 50, Some(&tile(Some(&lower))), false), OrderStatus::Valid);
    }

    #[test]
    fn expiry_is_strict() {
        let o = order(OrderSide::Sell, 100);
        assert_eq!(compute_order_status(&o, 100, None, false), OrderStatus::Valid);
        assert_eq!(compute_order_status(&o, 101, None, false), OrderStatus::OrderExpired);
    }

    #[test]
    fn owner_mismatch_only_for_sell_orders_with_known_owner() {
        let other = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
        let sell = order(OrderSide::Sell, 100);
        let buy = order(OrderSide::Buy, 100);
        assert_eq!(compute_order_status(&sell, 50, Some(&tile(Some(other))), false), OrderStatus::OwnerAddressMismatched);
        assert_eq!(compute_order_status(&buy, 50, Some(&tile(Some(other))), false), OrderStatus::Valid);
        assert_eq!(compute_order_status(&sell, 50, None, false), OrderStatus::Valid);
        assert_eq!(compute_order_status(&sell, 50, Some(&tile(None)), false), OrderStatus::Valid);
        assert_eq!(compute_order_status(&sell, 50, Some(&tile(Some(""))), false), OrderStatus::Valid);
    }

    #[test]
    fn precedence() {
        let other = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
        let o = order(OrderSide::Sell, 100);
        let t = tile(Some(other));
        assert_eq!(compute_order_status(&o, 200, Some(&t), false), OrderStatus::OrderExpired);
        assert_eq!(compute_order_status(&o, 200, Some(&t), true), OrderStatus::NonceBurned);
        assert_eq!(compute_order_status(&o, 50, Some(&t), true), OrderStatus::NonceBurned);
    }
}
