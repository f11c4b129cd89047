//! Allow-list snapshots.
//!
//! A snapshot is the JSON array the drop owner uploaded when setting the
//! claim phase. Each entry hashes into a merkle leaf
//! `keccak256(abi.encodePacked(address, quantityLimit, price, currency))`.
//! Prices are written in whole currency units ("0.01") and scaled by the
//! currency's decimals before hashing.

use std::path::Path;

use alloy_primitives::{keccak256, Address, B256, U256};
use claim_core::SdkError;
use serde::Deserialize;

use crate::abi::AllowlistProof;
use crate::merkle::MerkleTree;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub address: Address,
    /// `"0"` or `"unlimited"` lifts the per-wallet limit.
    #[serde(default = "unlimited")]
    pub max_claimable: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency_address: Option<Address>,
    /// Decimals of the entry's currency; native until resolved.
    #[serde(skip, default = "native_decimals")]
    price_decimals: u8,
}

fn unlimited() -> String {
    "unlimited".to_string()
}

fn native_decimals() -> u8 {
    NATIVE_DECIMALS
}

const NATIVE_DECIMALS: u8 = 18;

/// Scales a decimal amount to base units: `"0.01"` at 18 decimals is
/// `10^16`. `None` when malformed or more precise than `decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Option<U256> {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let digits_only = whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only || fraction.len() > usize::from(decimals) {
        return None;
    }
    let scaled = format!("{whole}{fraction:0<width$}", width = usize::from(decimals));
    U256::from_str_radix(&scaled, 10).ok()
}

impl SnapshotEntry {
    pub fn is_unlimited(&self) -> bool {
        matches!(self.max_claimable.as_str(), "0" | "unlimited" | "")
    }

    pub fn quantity_limit(&self) -> U256 {
        if self.is_unlimited() {
            U256::MAX
        } else {
            self.max_claimable.parse().unwrap_or(U256::MAX)
        }
    }

    fn has_price(&self) -> bool {
        self.price
            .as_deref()
            .map_or(false, |p| !p.is_empty() && p != "unlimited")
    }

    /// `uint256` max means "no price override".
    pub fn price_override(&self) -> U256 {
        if !self.has_price() {
            return U256::MAX;
        }
        self.price
            .as_deref()
            .and_then(|p| parse_units(p, self.price_decimals))
            .unwrap_or(U256::MAX)
    }

    pub fn currency(&self) -> Address {
        self.currency_address.unwrap_or(Address::ZERO)
    }

    pub fn leaf(&self) -> B256 {
        let mut packed = Vec::with_capacity(20 + 32 + 32 + 20);
        packed.extend_from_slice(self.address.as_slice());
        packed.extend_from_slice(&self.quantity_limit().to_be_bytes::<32>());
        packed.extend_from_slice(&self.price_override().to_be_bytes::<32>());
        packed.extend_from_slice(self.currency().as_slice());
        keccak256(packed)
    }
}

pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
    tree: MerkleTree,
}

impl Snapshot {
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        let tree = MerkleTree::new(entries.iter().map(SnapshotEntry::leaf).collect());
        Self { entries, tree }
    }

    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let entries: Vec<SnapshotEntry> =
            serde_json::from_str(json).map_err(|e| SdkError::Snapshot(e.to_string()))?;
        Ok(Self::new(entries))
    }

    /// Rebuilds the tree with each priced entry scaled by its currency's
    /// decimals, as reported by `decimals`.
    pub fn with_price_decimals<F>(mut self, mut decimals: F) -> Result<Self, SdkError>
    where
        F: FnMut(Address) -> Result<u8, SdkError>,
    {
        for entry in self.entries.iter_mut().filter(|e| e.has_price()) {
            entry.price_decimals = decimals(entry.currency())?;
            if entry.price_override() == U256::MAX {
                return Err(SdkError::Snapshot(format!(
                    "invalid price {:?} for {}",
                    entry.price.as_deref().unwrap_or_default(),
                    entry.address
                )));
            }
        }
        Ok(Self::new(self.entries))
    }

    /// Reads a snapshot from a local path or an http(s) URL.
    pub fn load(source: &str) -> Result<Self, SdkError> {
        let json = if source.starts_with("http://") || source.starts_with("https://") {
            ureq::get(source)
                .call()
                .map_err(|e| SdkError::Snapshot(format!("failed to fetch {source}: {e}")))?
                .into_body()
                .read_to_string()
                .map_err(|e| SdkError::Snapshot(format!("failed to read {source}: {e}")))?
        } else {
            std::fs::read_to_string(Path::new(source))
                .map_err(|e| SdkError::Snapshot(format!("failed to read {source}: {e}")))?
        };
        let snapshot = Self::from_json(&json)?;
        tracing::info!(source, entries = snapshot.len(), root = %snapshot.root(), "allow-list loaded");
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    pub fn entry(&self, wallet: Address) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.address == wallet)
    }

    /// Proof for `wallet`, or `None` when it is not listed.
    pub fn proof(&self, wallet: Address) -> Option<AllowlistProof> {
        let entry = self.entry(wallet)?;
        let proof = self.tree.proof(entry.leaf())?;
        Some(AllowlistProof {
            proof,
            quantityLimitPerWallet: entry.quantity_limit(),
            pricePerToken: entry.price_override(),
            currency: entry.currency(),
        })
    }
}

/// Proof for callers that are not on the allow-list.
pub fn empty_proof() -> AllowlistProof {
    AllowlistProof {
        proof: Vec::new(),
        quantityLimitPerWallet: U256::ZERO,
        pricePerToken: U256::MAX,
        currency: Address::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::merkle::verify;

    const JSON: &str = r#"[
        {"address": "0x00000000000000000000000000000000000000a1", "maxClaimable": "0"},
        {"address": "0x00000000000000000000000000000000000000B2", "maxClaimable": "3", "price": "0.01"},
        {"address": "0x00000000000000000000000000000000000000c3"}
    ]"#;

    #[test]
    fn test_parse_and_limits() {
        let snap = Snapshot::from_json(JSON).unwrap();
        assert_eq!(snap.len(), 3);
        let a1 = snap.entry(address!("00000000000000000000000000000000000000a1")).unwrap();
        assert!(a1.is_unlimited());
        assert_eq!(a1.quantity_limit(), U256::MAX);

        let b2 = snap.entry(address!("00000000000000000000000000000000000000b2")).unwrap();
        assert_eq!(b2.quantity_limit(), U256::from(3u64));
        assert_eq!(b2.price_override(), U256::from(10u64).pow(U256::from(16u64)));

        let c3 = snap.entry(address!("00000000000000000000000000000000000000c3")).unwrap();
        assert!(c3.is_unlimited());
        assert_eq!(c3.price_override(), U256::MAX);
    }

    #[test]
    fn test_proofs_verify_against_root() {
        let snap = Snapshot::from_json(JSON).unwrap();
        let wallet = address!("00000000000000000000000000000000000000b2");
        let proof = snap.proof(wallet).unwrap();
        let leaf = snap.entry(wallet).unwrap().leaf();
        assert!(verify(&proof.proof, snap.root(), leaf));
        assert_eq!(proof.quantityLimitPerWallet, U256::from(3u64));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("0.01", 18), Some(U256::from(10_000_000_000_000_000u64)));
        assert_eq!(parse_units("2.5", 6), Some(U256::from(2_500_000u64)));
        assert_eq!(parse_units("3", 0), Some(U256::from(3u64)));
        assert_eq!(parse_units(".5", 1), Some(U256::from(5u64)));
        assert_eq!(parse_units("0", 18), Some(U256::ZERO));
        assert_eq!(parse_units("0.001", 2), None);
        assert_eq!(parse_units("1e18", 18), None);
        assert_eq!(parse_units("", 18), None);
    }

    #[test]
    fn test_prices_scale_with_currency_decimals() {
        let usdc = address!("00000000000000000000000000000000000000e2");
        let json = r#"[
            {"address": "0x00000000000000000000000000000000000000a1", "price": "2.5",
             "currencyAddress": "0x00000000000000000000000000000000000000e2"},
            {"address": "0x00000000000000000000000000000000000000b2", "maxClaimable": "1"}
        ]"#;
        let raw = Snapshot::from_json(json).unwrap();
        let native_root = raw.root();
        let snap = raw
            .with_price_decimals(|currency| {
                assert_eq!(currency, usdc);
                Ok(6)
            })
            .unwrap();
        let a1 = address!("00000000000000000000000000000000000000a1");
        assert_eq!(snap.entry(a1).unwrap().price_override(), U256::from(2_500_000u64));
        assert_eq!(snap.proof(a1).unwrap().pricePerToken, U256::from(2_500_000u64));
        assert_ne!(snap.root(), native_root);
    }

    #[test]
    fn test_malformed_price_rejected() {
        let json = r#"[{"address": "0x00000000000000000000000000000000000000a1", "price": "cheap"}]"#;
        let err = Snapshot::from_json(json).unwrap().with_price_decimals(|_| Ok(18));
        assert!(matches!(err, Err(SdkError::Snapshot(_))));
    }

    #[test]
    fn test_unlisted_wallet() {
        let snap = Snapshot::from_json(JSON).unwrap();
        assert!(snap.proof(address!("00000000000000000000000000000000000000ff")).is_none());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(Snapshot::from_json("{}"), Err(SdkError::Snapshot(_))));
    }
}
