use chrono::{DateTime, Utc};

use super::TileCacheDatabase;
use crate::db_types::OwnershipBalance;

#[allow(async_fn_in_trait)]
pub trait OwnershipManagement: TileCacheDatabase {
    /// Fetches one balance that holds at least one token and has never been reconciled, or was last reconciled before
    /// `stale_before`.
    async fn fetch_next_stale_balance(
        &self,
        stale_before: DateTime<Utc>,
    ) -> Result<Option<OwnershipBalance>, Self::Error>;

    async fn mark_balance_reconciled(&self, id: i64, at: DateTime<Utc>) -> Result<(), Self::Error>;
}
