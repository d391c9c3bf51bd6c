use std::sync::{Arc, Mutex};

use crate::ledger::{LedgerClient, LedgerClientError};

/// A [`LedgerClient`] whose block height is set by the test. `None` makes every call fail.
#[derive(Clone, Debug, Default)]
pub struct StubLedgerClient {
    height: Arc<Mutex<Option<i64>>>,
}

impl StubLedgerClient {
    pub fn new(height: Option<i64>) -> Self {
        Self { height: Arc::new(Mutex::new(height)) }
    }

    pub fn set_height(&self, height: Option<i64>) {
        *self.height.lock().unwrap() = height;
    }
}

impl LedgerClient for StubLedgerClient {
    async fn block_height(&self) -> Result<i64, LedgerClientError> {
        let height = *self.height.lock().unwrap();
        height.ok_or_else(|| LedgerClientError::Transport("the stub ledger is offline".into()))
    }
}
