use thiserror::Error;
use tile_cache_engine::{ledger::LedgerClientError, SqliteDatabaseError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Database error. {0}")]
    BackendError(#[from] SqliteDatabaseError),
    #[error("Could not create the ledger client. {0}")]
    LedgerError(#[from] LedgerClientError),
    #[error("IO error. {0}")]
    IOError(#[from] std::io::Error),
}
