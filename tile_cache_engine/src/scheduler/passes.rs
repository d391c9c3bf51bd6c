use chrono::Utc;
use log::*;

use super::{PassOutcome, ReconciliationPass, SchedulerConfig};
use crate::{
    db::traits::{OrderBookManagement, OwnershipManagement, TileManagement},
    helpers::CollectionRegistry,
    ledger::BlockHeightWatch,
    tcm_api::{
        errors::ReconcileError,
        order_validation_api::{OrderValidationApi, ValidationOutcome},
        ownership_api::OwnershipApi,
        tile_price_api::TilePriceApi,
    },
};

/// Validates the stalest order and folds it into its tile's price.
pub struct OrderBookPass<B> {
    db: B,
    validation: OrderValidationApi<B>,
    prices: TilePriceApi<B>,
    block_height: BlockHeightWatch,
    config: SchedulerConfig,
}

impl<B> OrderBookPass<B>
where B: OrderBookManagement + TileManagement
{
    pub fn new(db: B, collections: CollectionRegistry, block_height: BlockHeightWatch, config: SchedulerConfig) -> Self {
        let validation = OrderValidationApi::new(db.clone(), collections.clone());
        let prices = TilePriceApi::new(db.clone(), collections);
        Self { db, validation, prices, block_height, config }
    }
}

impl<B> ReconciliationPass for OrderBookPass<B>
where B: OrderBookManagement + TileManagement
{
    fn name(&self) -> &str {
        "Order book"
    }

    async fn run_pass(&self) -> Result<PassOutcome, ReconcileError> {
        let stale_before = self.config.stale_before(Utc::now());
        let Some(order) = self.db.fetch_next_stale_order(stale_before).await.map_err(ReconcileError::database)? else {
            return Ok(PassOutcome::Idle);
        };
        // One snapshot per order. A refresh that lands mid-pass is seen by the next order.
        let block_height = self.block_height.current();
        let order = match self.validation.validate_order(&order, block_height).await? {
            ValidationOutcome::Updated(status) => order.with_status(status),
            ValidationOutcome::SkippedUnknownCollection | ValidationOutcome::SkippedNoBlockHeight => order,
        };
        let price = self.prices.reconcile_order(&order).await?;
        self.db.mark_order_reconciled(order.id, Utc::now()).await.map_err(ReconcileError::database)?;
        trace!("📝️ Order #{} reconciled. Price outcome: {price:?}", order.id);
        Ok(PassOutcome::Processed)
    }
}

/// Propagates the stalest non-empty balance to its tiles' owners.
pub struct OwnershipPass<B> {
    db: B,
    ownership: OwnershipApi<B>,
    config: SchedulerConfig,
}

impl<B> OwnershipPass<B>
where B: OwnershipManagement + TileManagement
{
    pub fn new(db: B, collections: CollectionRegistry, config: SchedulerConfig) -> Self {
        let ownership = OwnershipApi::new(db.clone(), collections);
        Self { db, ownership, config }
    }
}

impl<B> ReconciliationPass for OwnershipPass<B>
where B: OwnershipManagement + TileManagement
{
    fn name(&self) -> &str {
        "Ownership"
    }

    async fn run_pass(&self) -> Result<PassOutcome, ReconcileError> {
        let stale_before = self.config.stale_before(Utc::now());
        let Some(balance) =
            self.db.fetch_next_stale_balance(stale_before).await.map_err(ReconcileError::database)?
        else {
            return Ok(PassOutcome::Idle);
        };
        let outcome = self.ownership.reconcile_balance(&balance).await?;
        self.db.mark_balance_reconciled(balance.id, Utc::now()).await.map_err(ReconcileError::database)?;
        trace!("🪪️ Balance #{} reconciled. {outcome:?}", balance.id);
        Ok(PassOutcome::Processed)
    }
}
