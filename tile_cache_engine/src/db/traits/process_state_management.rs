use super::TileCacheDatabase;
use crate::db_types::ProcessState;

#[allow(async_fn_in_trait)]
pub trait ProcessStateManagement: TileCacheDatabase {
    /// Creates the process state record if it does not exist, and sets its latest block height.
    async fn upsert_latest_block_height(&self, height: i64) -> Result<(), Self::Error>;

    async fn fetch_process_state(&self) -> Result<Option<ProcessState>, Self::Error>;
}
