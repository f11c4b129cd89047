use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the SDK says the connected wallet cannot claim right now.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    NotEnoughSupply,
    AddressNotAllowed,
    WaitBeforeNextClaimTransaction,
    AlreadyClaimed,
    NotEnoughTokens,
    NoActiveClaimPhase,
    NoClaimConditionSet,
    NoWallet,
    ExceedsMaxClaimable,
    Unknown,
    Other(String),
}

impl IneligibilityReason {
    /// The SDK's own wording for the reason.
    pub fn sdk_text(&self) -> &str {
        match self {
            Self::NotEnoughSupply => "There is not enough supply to claim.",
            Self::AddressNotAllowed => "This address is not on the allowlist.",
            Self::WaitBeforeNextClaimTransaction => {
                "Not enough time since last claim transaction. Please wait."
            }
            Self::AlreadyClaimed => "You have already claimed the token.",
            Self::NotEnoughTokens => {
                "There are not enough tokens in the wallet to pay for the claim."
            }
            Self::NoActiveClaimPhase => {
                "There is no active claim phase at the moment. Please check back in later."
            }
            Self::NoClaimConditionSet => "There is no claim condition set.",
            Self::NoWallet => "No wallet connected.",
            Self::ExceedsMaxClaimable => "Cannot claim more than maximum allowed quantity.",
            Self::Unknown => "No claim conditions found.",
            Self::Other(text) => text,
        }
    }
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sdk_text())
    }
}

/// Button text for a list of reasons. The first reason has priority; some
/// texts depend on the quantity the visitor is trying to mint.
pub fn describe(reasons: &[IneligibilityReason], quantity: u32) -> String {
    let Some(reason) = reasons.first() else {
        return String::new();
    };
    match reason {
        IneligibilityReason::Unknown
        | IneligibilityReason::NoActiveClaimPhase
        | IneligibilityReason::NoClaimConditionSet => "This drop is not ready to be minted.".into(),
        IneligibilityReason::NotEnoughTokens => "You don't have enough currency to mint.".into(),
        IneligibilityReason::AddressNotAllowed if quantity > 1 => {
            format!("You are not eligible to mint {} tokens.", quantity)
        }
        IneligibilityReason::AddressNotAllowed => "You are not eligible to mint at this time.".into(),
        IneligibilityReason::ExceedsMaxClaimable if quantity > 1 => {
            format!("Cannot mint {} tokens, exceeds remaining allowance.", quantity)
        }
        other => other.sdk_text().to_string(),
    }
}
