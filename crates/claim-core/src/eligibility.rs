//! Claim eligibility resolution.
//!
//! Everything here is a pure derivation over the latest SDK signals. It is
//! recomputed on every redraw; nothing is retained between calls.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::Serialize;

use crate::amount::{cap_to_u32, format_units, parse_uint, uint_or};
use crate::constants::*;
use crate::fetch::Fetch;
use crate::ineligibility::{describe, IneligibilityReason};
use crate::supply::{aggregate, available_supply, SupplySummary};
use crate::types::{ClaimCondition, ClaimerProof, CurrencyValue};

/// Everything the resolver looks at.
#[derive(Clone, Copy, Debug)]
pub struct EligibilityInputs<'a> {
    pub claim_conditions: &'a Fetch<Vec<ClaimCondition>>,
    /// Active condition for the connected wallet (or the global one).
    pub active_condition: &'a Fetch<ClaimCondition>,
    pub claimer_proof: &'a Fetch<Option<ClaimerProof>>,
    pub ineligibility: &'a Fetch<Vec<IneligibilityReason>>,
    pub claimed_supply: &'a Fetch<String>,
    /// Quantity the ineligibility reasons were requested for.
    pub reasons_quantity: Option<u32>,
    pub wallet_connected: bool,
    pub quantity: u32,
    /// Unix seconds.
    pub now: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityState {
    /// No claim condition, or every condition has zero max supply.
    NotConfigured,
    /// Active condition not started yet, or its lookup failed.
    PendingStart,
    SoldOut,
    ConnectWallet,
    Eligible,
    Ineligible,
    Checking,
    Unavailable,
}

impl EligibilityState {
    /// States that replace the whole claim control with a message.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::NotConfigured | Self::PendingStart)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    pub state: EligibilityState,
    pub max_claimable: u32,
    pub is_sold_out: bool,
    pub can_claim: bool,
    pub price_to_mint: String,
    pub button_text: String,
    pub button_loading: bool,
    pub supply: SupplySummary,
}

impl Eligibility {
    pub fn button_disabled(&self) -> bool {
        match self.state {
            EligibilityState::ConnectWallet => false,
            _ => !self.can_claim || self.button_loading,
        }
    }
}

/// Upper bound for the quantity stepper.
///
/// Per-wallet caps come from the active condition unless an allow-list proof
/// overrides them. A proof of `"0"` is the SDK's "unlimited for this wallet"
/// marker, so only the remaining supply bounds it.
pub fn max_claimable(active: Option<&ClaimCondition>, proof: Option<&ClaimerProof>) -> u32 {
    let mut bound = uint_or(
        active.map(|c| c.max_claimable_supply.as_str()),
        0,
        UNLIMITED_CAP,
    );
    let per_wallet = uint_or(
        active.map(|c| c.max_claimable_per_wallet.as_str()),
        0,
        UNLIMITED_CAP,
    );
    if per_wallet <= bound {
        bound = per_wallet;
    }

    if let Some(proof) = proof.filter(|p| !p.max_claimable.is_empty()) {
        if proof.max_claimable == UNLIMITED_PROOF_SENTINEL {
            bound = BigUint::from(UNLIMITED_CAP);
        } else if let Some(v) = parse_uint(&proof.max_claimable) {
            bound = v;
        }
    }

    let total_available = available_supply(active.map(|c| c.available_supply.as_str()));
    cap_to_u32(&total_available.min(bound))
}

fn unit_price(currency: &CurrencyValue) -> BigUint {
    parse_uint(&currency.value).unwrap_or_default()
}

/// "0.06 ETH" for `quantity` tokens.
pub fn price_to_mint(currency: &CurrencyValue, quantity: u32) -> String {
    let total = unit_price(currency) * BigUint::from(quantity);
    let decimals = currency.decimals.unwrap_or(DEFAULT_CURRENCY_DECIMALS);
    format!("{} {}", format_units(&total, decimals), currency.symbol)
}

/// The direct available-supply check is authoritative; string equality of the
/// formatted counters is only a fallback.
fn is_sold_out(active: &Fetch<ClaimCondition>, supply: &SupplySummary) -> bool {
    let exhausted = active
        .data()
        .and_then(|c| parse_uint(&c.available_supply))
        .map_or(false, |v| v.is_zero());
    exhausted || supply.number_claimed == supply.number_total
}

fn not_configured(conditions: &Fetch<Vec<ClaimCondition>>) -> bool {
    conditions.data().map_or(false, |list| {
        list.is_empty() || list.iter().all(|c| c.max_claimable_supply == "0")
    })
}

fn pending_start(inputs: &EligibilityInputs<'_>) -> bool {
    let has_conditions = inputs
        .claim_conditions
        .data()
        .map_or(false, |list| !list.is_empty());
    let lookup_failed = has_conditions && inputs.active_condition.is_error();
    let not_started = inputs
        .active_condition
        .data()
        .map_or(false, |c| c.start_time > inputs.now);
    lookup_failed || not_started
}

pub fn resolve(inputs: &EligibilityInputs<'_>) -> Eligibility {
    let active = inputs.active_condition.data();
    let supply = aggregate(
        inputs.claimed_supply.data().map(String::as_str),
        active.map(|c| c.available_supply.as_str()),
    );
    let max_claimable = max_claimable(active, inputs.claimer_proof.data().and_then(Option::as_ref));
    let is_sold_out = is_sold_out(inputs.active_condition, &supply);
    let price_to_mint = active
        .map(|c| price_to_mint(&c.currency, inputs.quantity))
        .unwrap_or_default();
    let reasons = inputs.ineligibility.data();
    let reasons_stale = inputs.reasons_quantity.map_or(false, |q| q != inputs.quantity);

    let button_loading = inputs.active_condition.is_fetching()
        || inputs.claimed_supply.is_fetching()
        || inputs.ineligibility.is_fetching()
        || reasons_stale;
    let can_claim = inputs.active_condition.is_success()
        && reasons.map_or(false, |r| r.is_empty())
        && !is_sold_out
        && !button_loading;

    let state = if not_configured(inputs.claim_conditions) {
        EligibilityState::NotConfigured
    } else if pending_start(inputs) {
        EligibilityState::PendingStart
    } else if is_sold_out {
        EligibilityState::SoldOut
    } else if !inputs.wallet_connected {
        EligibilityState::ConnectWallet
    } else if button_loading {
        EligibilityState::Checking
    } else if can_claim {
        EligibilityState::Eligible
    } else if reasons.map_or(false, |r| !r.is_empty()) {
        EligibilityState::Ineligible
    } else {
        EligibilityState::Unavailable
    };

    let button_text = match state {
        EligibilityState::NotConfigured => TEXT_NOT_CONFIGURED.to_string(),
        EligibilityState::PendingStart => TEXT_STARTING_SOON.to_string(),
        EligibilityState::SoldOut => TEXT_SOLD_OUT.to_string(),
        EligibilityState::ConnectWallet => TEXT_CONNECT_WALLET.to_string(),
        EligibilityState::Eligible => {
            let free = active.map_or(true, |c| unit_price(&c.currency).is_zero());
            if free {
                TEXT_FREE_MINT.to_string()
            } else {
                format!("Mint ({})", price_to_mint)
            }
        }
        EligibilityState::Ineligible => describe(reasons.map(Vec::as_slice).unwrap_or_default(), inputs.quantity),
        EligibilityState::Checking => TEXT_CHECKING.to_string(),
        EligibilityState::Unavailable => TEXT_UNAVAILABLE.to_string(),
    };

    Eligibility {
        state,
        max_claimable,
        is_sold_out,
        can_claim,
        price_to_mint,
        button_text,
        button_loading,
        supply,
    }
}
