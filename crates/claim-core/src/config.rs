//! Embed configuration.
//!
//! The widget is configured entirely by the embed page's query string. It is
//! parsed once at startup into a [`WidgetConfig`] that is passed down
//! explicitly.

use std::collections::HashMap;

use serde::Serialize;
use url::Url;

use crate::chain::Chain;
use crate::constants::{DEFAULT_NETWORK, DEFAULT_TOKEN_ID};
use crate::errors::ConfigError;
use crate::theme::{PrimaryColor, Theme};
use crate::types::TokenId;

/// Gas-sponsorship relay selection. Relaying itself is the wallet's job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Gasless {
    #[default]
    None,
    OpenZeppelin { relayer_url: String },
    Biconomy { api_key: String, api_id: String },
}

impl Gasless {
    /// A relayer URL wins; Biconomy needs both key and id.
    pub fn from_params(relayer_url: &str, biconomy_api_key: &str, biconomy_api_id: &str) -> Self {
        if !relayer_url.is_empty() {
            Gasless::OpenZeppelin {
                relayer_url: relayer_url.to_string(),
            }
        } else if !biconomy_api_key.is_empty() && !biconomy_api_id.is_empty() {
            Gasless::Biconomy {
                api_key: biconomy_api_key.to_string(),
                api_id: biconomy_api_id.to_string(),
            }
        } else {
            Gasless::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gasless::None => "off",
            Gasless::OpenZeppelin { .. } => "openzeppelin",
            Gasless::Biconomy { .. } => "biconomy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    /// `None` renders the empty state.
    pub contract: Option<String>,
    pub token_id: TokenId,
    pub theme: Theme,
    pub chain: Chain,
    pub primary_color: Option<PrimaryColor>,
    pub gasless: Gasless,
}

impl WidgetConfig {
    /// Accepts a full embed URL, or a bare query string with or without the
    /// leading `?`.
    pub fn from_embed(embed: &str) -> Result<Self, ConfigError> {
        if embed.contains("://") {
            let url = Url::parse(embed).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
            Self::from_url(&url)
        } else {
            Self::from_query(embed.trim_start_matches('?'))
        }
    }

    pub fn from_url(url: &Url) -> Result<Self, ConfigError> {
        Self::from_query(url.query().unwrap_or(""))
    }

    pub fn from_query(query: &str) -> Result<Self, ConfigError> {
        // First occurrence of a key wins; empty values count as absent.
        let mut params: HashMap<String, String> = HashMap::new();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }
        let get = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let contract = match get("contract").or_else(|| get("contractAddress")) {
            Some(addr) if is_address(addr) => Some(addr.to_string()),
            Some(addr) => return Err(ConfigError::InvalidContract(addr.to_string())),
            None => None,
        };

        let token_id: TokenId = get("tokenId").unwrap_or(DEFAULT_TOKEN_ID).parse()?;

        let chain = match get("chain") {
            Some(json) => {
                let chain: Chain = serde_json::from_str(json)
                    .map_err(|e| ConfigError::InvalidChain(e.to_string()))?;
                if chain.rpc_url().is_none() {
                    return Err(ConfigError::InvalidChain(format!(
                        "no usable rpc url for chain {}",
                        chain.chain_id
                    )));
                }
                chain
            }
            None => {
                let network = get("network").unwrap_or(DEFAULT_NETWORK);
                Chain::by_slug(network).ok_or_else(|| ConfigError::UnknownNetwork(network.to_string()))?
            }
        };

        Ok(WidgetConfig {
            contract,
            token_id,
            theme: Theme::from_param(get("theme").unwrap_or("light")),
            chain,
            primary_color: get("primaryColor").map(PrimaryColor::from_param),
            gasless: Gasless::from_params(
                get("relayUrl").unwrap_or(""),
                get("biconomyApiKey").unwrap_or(""),
                get("biconomyApiId").unwrap_or(""),
            ),
        })
    }
}

fn is_address(raw: &str) -> bool {
    raw.strip_prefix("0x")
        .map_or(false, |hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}
