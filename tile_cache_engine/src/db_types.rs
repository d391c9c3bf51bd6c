use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::Type;
pub use tcm_common::WeiAmount;
use thiserror::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

//--------------------------------------   Identifiers       ---------------------------------------------------------
string_id!(
    /// The deployment-local name of a tracked NFT collection, e.g. `"cryptopunks"`.
    CollectionId
);
string_id!(
    /// A token id within a collection. uint256 on-chain, treated as an opaque string here.
    TokenId
);
string_id!(
    /// The signer nonce embedded in an order-book entry.
    Nonce
);

//--------------------------------------     OrderStatus       ---------------------------------------------------------
/// The validity of an order-book entry against current ledger facts. The string forms are the order-book wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order could be filled on-chain right now.
    #[serde(rename = "valid")]
    Valid,
    /// A sell order whose signer no longer owns the token. Filling it would revert.
    #[serde(rename = "ownerAddressMismatched")]
    OwnerAddressMismatched,
    /// The order's expiry block is behind the chain tip.
    #[serde(rename = "orderExpired")]
    OrderExpired,
    /// The signer has revoked the order's nonce. This is final.
    #[serde(rename = "nonceBurned")]
    NonceBurned,
}

impl OrderStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, OrderStatus::Valid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Valid => "valid",
            OrderStatus::OwnerAddressMismatched => "ownerAddressMismatched",
            OrderStatus::OrderExpired => "orderExpired",
            OrderStatus::NonceBurned => "nonceBurned",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self::Valid),
            "ownerAddressMismatched" => Ok(Self::OwnerAddressMismatched),
            "orderExpired" => Ok(Self::OrderExpired),
            "nonceBurned" => Ok(Self::NonceBurned),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

/// Reads a status column written by someone else. Unknown values are logged and treated as "never validated", which
/// the price reconciler handles exactly like an invalid order.
pub fn status_from_column(value: Option<String>) -> Option<OrderStatus> {
    value.and_then(|s| {
        s.parse()
            .map_err(|e| error!("🗃️ {e}. Treating the order as not yet validated."))
            .ok()
    })
}

//--------------------------------------      OrderSide        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    /// An offer to sell the token for `currency_token_amount`. Sell orders drive the cached lowest price.
    Sell,
    /// An offer to buy the token. Buy-side price aggregation is not performed yet.
    Buy,
}

impl OrderSide {
    pub fn from_is_sell_order(is_sell_order: bool) -> Self {
        if is_sell_order {
            Self::Sell
        } else {
            Self::Buy
        }
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, OrderSide::Sell)
    }
}

impl Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Sell => write!(f, "Sell"),
            OrderSide::Buy => write!(f, "Buy"),
        }
    }
}

//--------------------------------------    OrderBookEntry     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookEntry {
    pub id: i64,
    pub nft_contract_address: String,
    pub nft_token_id: TokenId,
    /// The signer of the order
    pub order_creator: String,
    pub side: OrderSide,
    /// For sell orders, the asking price.
    pub currency_token_amount: WeiAmount,
    /// The order cannot be filled once the chain has passed this block.
    pub expires_at_block: i64,
    pub nonce: Nonce,
    /// `None` until the order has been validated at least once.
    pub status: Option<OrderStatus>,
    pub last_reconciled_at: Option<DateTime<Utc>>,
}

impl OrderBookEntry {
    pub fn is_valid(&self) -> bool {
        self.status.map(|s| s.is_valid()).unwrap_or(false)
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

//--------------------------------------   NewOrderBookEntry   ---------------------------------------------------------
/// An order-book entry as written by the external order-book writer.
#[derive(Debug, Clone)]
pub struct NewOrderBookEntry {
    pub nft_contract_address: String,
    pub nft_token_id: TokenId,
    pub order_creator: String,
    pub side: OrderSide,
    pub currency_token_amount: WeiAmount,
    pub expires_at_block: i64,
    pub nonce: Nonce,
}

impl NewOrderBookEntry {
    pub fn sell(contract: &str, token_id: &str, creator: &str, price: WeiAmount, expires_at_block: i64) -> Self {
        Self {
            nft_contract_address: contract.to_string(),
            nft_token_id: token_id.into(),
            order_creator: creator.to_string(),
            side: OrderSide::Sell,
            currency_token_amount: price,
            expires_at_block,
            nonce: Nonce(derived_nonce(contract, token_id, creator, price, expires_at_block).to_string()),
        }
    }

    pub fn buy(contract: &str, token_id: &str, creator: &str, price: WeiAmount, expires_at_block: i64) -> Self {
        Self { side: OrderSide::Buy, ..Self::sell(contract, token_id, creator, price, expires_at_block) }
    }

    pub fn with_nonce<N: Into<Nonce>>(mut self, nonce: N) -> Self {
        self.nonce = nonce.into();
        self
    }
}

/// A deterministic placeholder nonce for constructors that are not given one explicitly.
fn derived_nonce(contract: &str, token_id: &str, creator: &str, price: WeiAmount, expires_at_block: i64) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    (contract, token_id, creator, price, expires_at_block).hash(&mut hasher);
    hasher.finish()
}

//--------------------------------------   OwnershipBalance    ---------------------------------------------------------
/// The set of tokens of one contract held by one account, as reported by the ledger indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipBalance {
    pub id: i64,
    pub contract_address: String,
    pub account_address: String,
    pub token_ids: BTreeSet<TokenId>,
    pub last_reconciled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewOwnershipBalance {
    pub contract_address: String,
    pub account_address: String,
    pub token_ids: BTreeSet<TokenId>,
}

impl NewOwnershipBalance {
    pub fn new<I, T>(contract_address: &str, account_address: &str, token_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TokenId>,
    {
        Self {
            contract_address: contract_address.to_string(),
            account_address: account_address.to_string(),
            token_ids: token_ids.into_iter().map(Into::into).collect(),
        }
    }
}

//--------------------------------------    TileCacheEntry     ---------------------------------------------------------
/// The cached, queryable view of one token: its owner and its best sale offer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCacheEntry {
    pub id: i64,
    pub collection_id: CollectionId,
    pub token_id: TokenId,
    pub owner_address: Option<String>,
    pub lowest_sale_price: Option<WeiAmount>,
    /// The order that set `lowest_sale_price`
    pub lowest_sale_price_order_id: Option<i64>,
    /// `-lowest_sale_price`, so that a descending sort lists the cheapest tiles first.
    pub price_sort_key: Option<f64>,
}

impl TileCacheEntry {
    /// The owner, if the cache knows one. Blank strings written by the seeding process count as unknown.
    pub fn known_owner(&self) -> Option<&str> {
        self.owner_address.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The current price and the order that set it, if both are present.
    pub fn current_price(&self) -> Option<TilePrice> {
        match (self.lowest_sale_price, self.lowest_sale_price_order_id) {
            (Some(price), Some(order_id)) => Some(TilePrice { price, order_id }),
            _ => None,
        }
    }

    pub fn is_price_set_by(&self, order_id: i64) -> bool {
        self.lowest_sale_price_order_id == Some(order_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewTileCacheEntry {
    pub collection_id: CollectionId,
    pub token_id: TokenId,
    pub owner_address: Option<String>,
}

impl NewTileCacheEntry {
    pub fn new(collection_id: &str, token_id: &str) -> Self {
        Self { collection_id: collection_id.into(), token_id: token_id.into(), owner_address: None }
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner_address = Some(owner.to_string());
        self
    }
}

//--------------------------------------       TilePrice       ---------------------------------------------------------
/// The three price fields of a tile, always written together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePrice {
    pub price: WeiAmount,
    pub order_id: i64,
}

impl TilePrice {
    pub fn from_order(order: &OrderBookEntry) -> Self {
        Self { price: order.currency_token_amount, order_id: order.id }
    }

    pub fn sort_key(&self) -> f64 {
        self.price.sort_key()
    }
}

//--------------------------------------     ProcessState      ---------------------------------------------------------
/// Process-wide facts shared through the store. There is exactly one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessState {
    pub latest_block_height: i64,
    pub updated_at: DateTime<Utc>,
}
