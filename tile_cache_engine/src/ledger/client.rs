use std::time::Duration;

use log::*;
use serde::Deserialize;
use serde_json::json;
use tcm_common::Secret;

use super::LedgerClientError;

/// The interface to a ledger node. Implementations may fail transiently; callers retry on their own schedule.
#[allow(async_fn_in_trait)]
pub trait LedgerClient {
    /// Fetches the height of the latest block.
    async fn block_height(&self) -> Result<i64, LedgerClientError>;
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// A [`LedgerClient`] that talks JSON-RPC 2.0 to an EVM-compatible node.
#[derive(Clone, Debug)]
pub struct JsonRpcLedgerClient {
    url: Secret<String>,
    client: reqwest::Client,
}

impl JsonRpcLedgerClient {
    pub fn new(url: Secret<String>, timeout: Duration) -> Result<Self, LedgerClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    async fn call(&self, method: &str) -> Result<String, LedgerClientError> {
        let body = json!({ "jsonrpc": "2.0", "method": method, "params": [], "id": 1 });
        trace!("⛓️ Calling {method}");
        let response = self.client.post(self.url.reveal()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerClientError::HttpStatus(status.as_u16()));
        }
        let response = response.json::<JsonRpcResponse>().await?;
        match response {
            JsonRpcResponse { error: Some(e), .. } => Err(LedgerClientError::RpcError { code: e.code, message: e.message }),
            JsonRpcResponse { result: Some(result), .. } => Ok(result),
            _ => Err(LedgerClientError::InvalidResponse(format!("{method} returned neither a result nor an error"))),
        }
    }
}

impl LedgerClient for JsonRpcLedgerClient {
    async fn block_height(&self) -> Result<i64, LedgerClientError> {
        let result = self.call("eth_blockNumber").await?;
        parse_block_height(&result)
    }
}

/// Parses a `0x`-prefixed hex quantity into a block height.
pub(crate) fn parse_block_height(value: &str) -> Result<i64, LedgerClientError> {
    let hex = value
        .strip_prefix("0x")
        .ok_or_else(|| LedgerClientError::InvalidResponse(format!("'{value}' is not a hex quantity")))?;
    let height = u64::from_str_radix(hex, 16)
        .map_err(|e| LedgerClientError::InvalidResponse(format!("'{value}' is not a hex quantity. {e}")))?;
    i64::try_from(height).map_err(|_| LedgerClientError::InvalidResponse(format!("Block height {height} is too large")))
}
