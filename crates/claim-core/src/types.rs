use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::amount::parse_uint;
use crate::errors::ConfigError;

/// ERC1155 token id (a uint256).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenId(pub BigUint);

impl FromStr for TokenId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uint(s)
            .map(TokenId)
            .ok_or_else(|| ConfigError::InvalidTokenId(s.to_string()))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price of one token in the condition's currency.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyValue {
    /// Raw price in the currency's smallest unit.
    pub value: String,
    pub decimals: Option<u8>,
    pub symbol: String,
}

/// A claim phase as reported by the SDK. Numeric fields are raw strings so
/// that markers like `"unlimited"` survive until the resolver's fallbacks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimCondition {
    /// Unix seconds.
    pub start_time: u64,
    pub max_claimable_supply: String,
    pub max_claimable_per_wallet: String,
    pub available_supply: String,
    pub currency: CurrencyValue,
}

/// Allow-list entitlement for one wallet.
///
/// `max_claimable == "0"` means the wallet may claim without limit. It does
/// NOT mean zero are allowed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimerProof {
    pub max_claimable: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}
