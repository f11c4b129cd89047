//! In-memory drop contract for exercising the widget without a chain.
//!
//! Models a single ERC1155 token with one active claim phase, an optional
//! allow-list and a supply counter that claims actually move.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use claim_core::ineligibility::IneligibilityReason;
use claim_core::types::{ClaimCondition, ClaimerProof, ContractMetadata, CurrencyValue, TokenMetadata};
use claim_core::{DropSdk, SdkError, TokenId};

pub const WALLET: &str = "0x00000000000000000000000000000000000000a1";

pub struct MockDrop {
    pub contract: ContractMetadata,
    pub token: TokenMetadata,
    pub claimed: u64,
    /// All phases; the last one whose start time has passed is active.
    pub conditions: Vec<ClaimCondition>,
    /// Lower-cased wallet -> allow-list entitlement ("0" = unlimited).
    pub allowlist: HashMap<String, String>,
    /// Overrides the computed ineligibility reasons.
    pub forced_reasons: Option<Vec<IneligibilityReason>>,
    /// Next `claim` fails with this.
    pub claim_error: Option<SdkError>,
    /// Query names that fail with a transport error.
    pub failing: HashSet<&'static str>,
    pub wallet: Option<String>,
    pub connect_as: String,
    pub now: u64,
    calls: RefCell<Vec<String>>,
    tx_counter: u64,
}

/// A started, free phase with the given limits.
pub fn phase(max_supply: &str, per_wallet: &str, available: &str, price: &str) -> ClaimCondition {
    ClaimCondition {
        start_time: 0,
        max_claimable_supply: max_supply.to_string(),
        max_claimable_per_wallet: per_wallet.to_string(),
        available_supply: available.to_string(),
        currency: CurrencyValue {
            value: price.to_string(),
            decimals: Some(18),
            symbol: "ETH".to_string(),
        },
    }
}

impl Default for MockDrop {
    fn default() -> Self {
        MockDrop {
            contract: ContractMetadata {
                name: "Mock Drop".to_string(),
                description: Some("Test collection".to_string()),
                image: Some("ipfs://contract".to_string()),
            },
            token: TokenMetadata {
                name: Some("Token".to_string()),
                description: None,
                image: Some("ipfs://token".to_string()),
            },
            claimed: 0,
            conditions: vec![phase("100", "5", "100", "0")],
            allowlist: HashMap::new(),
            forced_reasons: None,
            claim_error: None,
            failing: HashSet::new(),
            wallet: None,
            connect_as: WALLET.to_string(),
            now: 1_700_000_000,
            calls: RefCell::new(Vec::new()),
            tx_counter: 0,
        }
    }
}

impl MockDrop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conditions(mut self, conditions: Vec<ClaimCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_claimed(mut self, claimed: u64) -> Self {
        self.claimed = claimed;
        self
    }

    pub fn with_allowlist(mut self, wallet: &str, max_claimable: &str) -> Self {
        self.allowlist
            .insert(wallet.to_lowercase(), max_claimable.to_string());
        self
    }

    pub fn with_wallet(mut self) -> Self {
        self.wallet = Some(self.connect_as.clone());
        self
    }

    pub fn failing(mut self, query: &'static str) -> Self {
        self.failing.insert(query);
        self
    }

    /// Names of the SDK methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), SdkError> {
        self.calls.borrow_mut().push(call.to_string());
        if self.failing.contains(call) {
            return Err(SdkError::Transport(format!("{call} unavailable")));
        }
        Ok(())
    }

    fn active(&self) -> Option<&ClaimCondition> {
        self.conditions.iter().rev().find(|c| c.start_time <= self.now)
    }

    fn entitlement(&self, wallet: &str) -> Option<&String> {
        self.allowlist.get(&wallet.to_lowercase())
    }
}

impl DropSdk for MockDrop {
    fn contract_metadata(&self) -> Result<ContractMetadata, SdkError> {
        self.record("contract_metadata")?;
        Ok(self.contract.clone())
    }

    fn token_metadata(&self, _token: &TokenId) -> Result<TokenMetadata, SdkError> {
        self.record("token_metadata")?;
        Ok(self.token.clone())
    }

    fn claimed_supply(&self, _token: &TokenId) -> Result<String, SdkError> {
        self.record("claimed_supply")?;
        Ok(self.claimed.to_string())
    }

    fn active_claim_condition(
        &self,
        _token: &TokenId,
        wallet: Option<&str>,
    ) -> Result<ClaimCondition, SdkError> {
        self.record("active_claim_condition")?;
        let mut active = self
            .active()
            .cloned()
            .ok_or_else(|| SdkError::Rpc {
                code: 3,
                message: "execution reverted".to_string(),
                reason: Some("!CONDITION".to_string()),
            })?;
        if let Some(limit) = wallet.and_then(|w| self.entitlement(w)) {
            active.max_claimable_per_wallet = if limit == "0" {
                "unlimited".to_string()
            } else {
                limit.clone()
            };
        }
        Ok(active)
    }

    fn claim_conditions(&self, _token: &TokenId) -> Result<Vec<ClaimCondition>, SdkError> {
        self.record("claim_conditions")?;
        Ok(self.conditions.clone())
    }

    fn claimer_proof(&self, _token: &TokenId, wallet: &str) -> Result<Option<ClaimerProof>, SdkError> {
        self.record("claimer_proof")?;
        Ok(self.entitlement(wallet).map(|limit| ClaimerProof {
            max_claimable: limit.clone(),
        }))
    }

    fn ineligibility_reasons(
        &self,
        _token: &TokenId,
        quantity: u32,
        wallet: &str,
    ) -> Result<Vec<IneligibilityReason>, SdkError> {
        self.record("ineligibility_reasons")?;
        if let Some(forced) = &self.forced_reasons {
            return Ok(forced.clone());
        }
        let Some(active) = self.active() else {
            return Ok(vec![IneligibilityReason::NoActiveClaimPhase]);
        };
        let mut reasons = Vec::new();
        let available: u64 = active.available_supply.parse().unwrap_or(u64::MAX);
        if u64::from(quantity) > available {
            reasons.push(IneligibilityReason::NotEnoughSupply);
        }
        let limit = match self.entitlement(wallet) {
            Some(limit) if limit == "0" => u64::MAX,
            Some(limit) => limit.parse().unwrap_or(u64::MAX),
            None if !self.allowlist.is_empty() => {
                reasons.push(IneligibilityReason::AddressNotAllowed);
                return Ok(reasons);
            }
            None => active.max_claimable_per_wallet.parse().unwrap_or(u64::MAX),
        };
        if u64::from(quantity) > limit {
            reasons.push(IneligibilityReason::ExceedsMaxClaimable);
        }
        Ok(reasons)
    }

    fn claim(&mut self, _token: &TokenId, quantity: u32) -> Result<String, SdkError> {
        self.record("claim")?;
        if self.wallet.is_none() {
            return Err(SdkError::NoWallet);
        }
        if let Some(err) = self.claim_error.take() {
            return Err(err);
        }
        self.claimed += u64::from(quantity);
        let now = self.now;
        if let Some(active) = self.conditions.iter_mut().rev().find(|c| c.start_time <= now) {
            if let Ok(available) = active.available_supply.parse::<u64>() {
                active.available_supply = available.saturating_sub(u64::from(quantity)).to_string();
            }
        }
        self.tx_counter += 1;
        Ok(format!("0x{:064x}", self.tx_counter))
    }

    fn connect_wallet(&mut self) -> Result<String, SdkError> {
        self.record("connect_wallet")?;
        self.wallet = Some(self.connect_as.clone());
        Ok(self.connect_as.clone())
    }

    fn wallet_address(&self) -> Option<String> {
        self.wallet.clone()
    }
}
