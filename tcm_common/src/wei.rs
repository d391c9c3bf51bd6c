use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode,
    Encode,
    Type,
};
use thiserror::Error;

//--------------------------------------     WeiAmount       ---------------------------------------------------------
/// An amount of the currency token, in its smallest unit.
///
/// Order-book amounts routinely exceed `i64::MAX` (a handful of whole tokens at 18 decimals), so the value is held as
/// a `u128` and stored as a decimal string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeiAmount(u128);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a wei amount: {0}")]
pub struct WeiConversionError(String);

impl From<u128> for WeiAmount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for WeiAmount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl FromStr for WeiAmount {
    type Err = WeiConversionError;

    /// Accepts plain decimal strings as well as `0x`-prefixed hex, which is how some indexers serialise uint256 values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u128::from_str_radix(hex, 16),
            None => s.parse::<u128>(),
        };
        parsed.map(Self).map_err(|e| WeiConversionError(format!("{s} ({e})")))
    }
}

impl TryFrom<String> for WeiAmount {
    type Error = WeiConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeiAmount> for String {
    fn from(value: WeiAmount) -> Self {
        value.0.to_string()
    }
}

impl Display for WeiAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

impl WeiAmount {
    pub fn value(&self) -> u128 {
        self.0
    }

    /// The numeric key used to sort tiles by ascending price with a descending sort. Precision loss above 2^53 wei
    /// only affects ordering between near-identical prices.
    #[allow(clippy::cast_precision_loss)]
    pub fn sort_key(&self) -> f64 {
        -(self.0 as f64)
    }
}

impl Type<Sqlite> for WeiAmount {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for WeiAmount {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> IsNull {
        <String as Encode<'q, Sqlite>>::encode(self.0.to_string(), buf)
    }
}

impl<'r> Decode<'r, Sqlite> for WeiAmount {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <&str as Decode<'r, Sqlite>>::decode(value)?;
        Ok(s.parse::<WeiAmount>()?)
    }
}
