use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Chain descriptor in the shape embed pages pass through the `chain`
/// parameter (camelCase JSON).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub chain_id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub rpc: Vec<String>,
    pub native_currency: NativeCurrency,
}

// (slug, chain id, name, public rpc, native symbol)
const KNOWN_CHAINS: &[(&str, u64, &str, &str, &str)] = &[
    ("ethereum", 1, "Ethereum Mainnet", "https://ethereum-rpc.publicnode.com", "ETH"),
    ("sepolia", 11155111, "Sepolia", "https://ethereum-sepolia-rpc.publicnode.com", "ETH"),
    ("polygon", 137, "Polygon Mainnet", "https://polygon-rpc.com", "POL"),
    ("arbitrum", 42161, "Arbitrum One", "https://arb1.arbitrum.io/rpc", "ETH"),
    ("optimism", 10, "OP Mainnet", "https://mainnet.optimism.io", "ETH"),
    ("base", 8453, "Base", "https://mainnet.base.org", "ETH"),
    ("base-sepolia-testnet", 84532, "Base Sepolia", "https://sepolia.base.org", "ETH"),
    ("avalanche", 43114, "Avalanche C-Chain", "https://api.avax.network/ext/bc/C/rpc", "AVAX"),
    ("binance", 56, "BNB Smart Chain", "https://bsc-dataseed.binance.org", "BNB"),
    ("localhost", 1337, "Localhost", "http://127.0.0.1:8545", "ETH"),
];

impl Chain {
    pub fn by_slug(slug: &str) -> Option<Chain> {
        let slug = slug.to_lowercase();
        let slug = match slug.as_str() {
            "mainnet" => "ethereum",
            "matic" => "polygon",
            "bsc" => "binance",
            "local" | "localnet" | "anvil" | "hardhat" => "localhost",
            s => s,
        };
        KNOWN_CHAINS
            .iter()
            .find(|(s, ..)| *s == slug)
            .map(|(s, id, name, rpc, symbol)| Chain {
                chain_id: *id,
                name: name.to_string(),
                slug: s.to_string(),
                rpc: vec![rpc.to_string()],
                native_currency: NativeCurrency {
                    name: symbol.to_string(),
                    symbol: symbol.to_string(),
                    decimals: 18,
                },
            })
    }

    /// First RPC endpoint that needs no templated API key.
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc
            .iter()
            .map(String::as_str)
            .find(|url| !url.contains("${") && (url.starts_with("http://") || url.starts_with("https://")))
    }
}
