use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerClientError {
    #[error("Could not reach the ledger node: {0}")]
    Transport(String),
    #[error("The ledger node responded with HTTP status {0}")]
    HttpStatus(u16),
    #[error("The ledger node returned error {code}: {message}")]
    RpcError { code: i64, message: String },
    #[error("Unexpected response from the ledger node: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LedgerClientError {
    fn from(e: reqwest::Error) -> Self {
        // The RPC URL usually carries an API key, so it must not end up in the error message.
        Self::Transport(e.without_url().to_string())
    }
}
