use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::TileManagement,
    db_types::OwnershipBalance,
    helpers::{same_address, to_checksum_address, CollectionRegistry},
    tcm_api::errors::ReconcileError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOutcome {
    UnknownCollection,
    /// `checked` tiles were found for the balance's tokens, and `updated` of them had their owner rewritten.
    Reconciled { checked: usize, updated: usize },
}

/// Propagates ownership balances to the tile cache.
pub struct OwnershipApi<B> {
    db: B,
    collections: CollectionRegistry,
}

impl<B> Debug for OwnershipApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OwnershipApi")
    }
}

impl<B> OwnershipApi<B> {
    pub fn new(db: B, collections: CollectionRegistry) -> Self {
        Self { db, collections }
    }
}

impl<B> OwnershipApi<B>
where B: TileManagement
{
    /// Sets the owner of every tile named by `balance` to the balance's account, in checksummed form. Tokens without a
    /// tile are skipped, and tiles that already record the same owner are not rewritten.
    pub async fn reconcile_balance(&self, balance: &OwnershipBalance) -> Result<BalanceOutcome, ReconcileError> {
        let Some(collection_id) = self.collections.resolve(&balance.contract_address) else {
            debug!("🪪️ Balance #{} is for untracked contract {}. Skipping.", balance.id, balance.contract_address);
            return Ok(BalanceOutcome::UnknownCollection);
        };
        let owner = to_checksum_address(&balance.account_address);
        let mut checked = 0;
        let mut updated = 0;
        for token_id in &balance.token_ids {
            let Some(tile) = self.db.fetch_tile(&collection_id, token_id).await.map_err(ReconcileError::database)?
            else {
                trace!("🪪️ No tile for {collection_id}/{token_id}");
                continue;
            };
            checked += 1;
            if tile.known_owner().is_some_and(|current| same_address(current, &owner)) {
                continue;
            }
            self.db.update_tile_owner(tile.id, &owner).await.map_err(ReconcileError::database)?;
            updated += 1;
            debug!("🪪️ Tile {collection_id}/{token_id} is now owned by {owner}");
        }
        Ok(BalanceOutcome::Reconciled { checked, updated })
    }
}
