use std::time::Duration;

use serde::Serialize;

use crate::constants::{FAILURE_TOAST_SECS, SUCCESS_TOAST_SECS};
use crate::eligibility::{Eligibility, EligibilityState};
use crate::sdk::DropSdk;
use crate::types::TokenId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Success,
    Destructive,
}

/// Transient toast shown after a claim attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    #[serde(skip)]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Notification {
    pub fn success(tx_hash: String) -> Self {
        Notification {
            title: "Successfully minted".to_string(),
            description: "The NFT has been transferred to your wallet".to_string(),
            variant: Variant::Success,
            duration: Duration::from_secs(SUCCESS_TOAST_SECS),
            tx_hash: Some(tx_hash),
        }
    }

    pub fn failure(description: String) -> Self {
        Notification {
            title: "Failed to mint drop".to_string(),
            description,
            variant: Variant::Destructive,
            duration: Duration::from_secs(FAILURE_TOAST_SECS),
            tx_hash: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.variant == Variant::Success
    }
}

/// Runs the claim and maps the outcome to a notification. Failures are logged
/// and reported once; nothing is retried.
pub fn dispatch<S: DropSdk + ?Sized>(sdk: &mut S, token: &TokenId, quantity: u32) -> Notification {
    match sdk.claim(token, quantity) {
        Ok(tx_hash) => {
            tracing::info!(%token, quantity, %tx_hash, "claim confirmed");
            Notification::success(tx_hash)
        }
        Err(err) => {
            tracing::error!(%token, quantity, error = ?err, "claim failed");
            Notification::failure(err.reason().unwrap_or_default().to_string())
        }
    }
}

/// Like [`dispatch`], but returns `None` without touching the SDK unless the
/// resolved state allows claiming `quantity`.
pub fn dispatch_checked<S: DropSdk + ?Sized>(
    sdk: &mut S,
    token: &TokenId,
    quantity: u32,
    eligibility: &Eligibility,
) -> Option<Notification> {
    let allowed = eligibility.state == EligibilityState::Eligible
        && !eligibility.button_disabled()
        && (1..=eligibility.max_claimable).contains(&quantity);
    if !allowed {
        tracing::warn!(
            state = ?eligibility.state,
            quantity,
            max = eligibility.max_claimable,
            "claim refused locally"
        );
        return None;
    }
    Some(dispatch(sdk, token, quantity))
}
