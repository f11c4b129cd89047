//! Render model for the widget page.

use serde::Serialize;

use crate::config::WidgetConfig;
use crate::constants::{TEXT_NO_CONTRACT, TEXT_SOLD_OUT};
use crate::eligibility::Eligibility;
use crate::errors::ConfigError;
use crate::fetch::Fetch;
use crate::quantity::{can_decrement, can_increment};
use crate::state::DropState;
use crate::theme::{PrimaryColor, Theme};

/// A piece of page content that may still be loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Slot {
    Loading,
    Shown(String),
    Hidden,
}

impl Slot {
    pub fn text(&self) -> Option<&str> {
        match self {
            Slot::Shown(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stepper {
    /// `None` while sold out; the value is replaced by "Sold Out".
    pub value: Option<u32>,
    pub label: String,
    pub can_decrement: bool,
    pub can_increment: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Button {
    pub text: String,
    pub disabled: bool,
    pub loading: bool,
    pub color: Option<PrimaryColor>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClaimArea {
    /// Replaces stepper and button entirely.
    Message { text: String },
    Controls { stepper: Stepper, button: Button },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DropView {
    pub theme: Theme,
    pub chain: String,
    pub contract: String,
    pub token_id: String,
    pub wallet: Option<String>,
    pub image: Slot,
    pub supply: Slot,
    pub title: Slot,
    pub description: Slot,
    pub claim: ClaimArea,
    pub eligibility: Eligibility,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum WidgetView {
    /// Nothing to show; carries the static message.
    Empty { message: String },
    Misconfigured { message: String },
    Drop(Box<DropView>),
}

impl WidgetView {
    pub fn config_error(err: &ConfigError) -> Self {
        WidgetView::Misconfigured {
            message: err.to_string(),
        }
    }

    pub fn derive(config: &WidgetConfig, state: &DropState, quantity: u32, now: u64) -> Self {
        let Some(contract) = config.contract.clone() else {
            return WidgetView::Empty {
                message: TEXT_NO_CONTRACT.to_string(),
            };
        };
        let eligibility = state.eligibility(quantity, now);

        // Image and supply share the claim-data loading flag.
        let data_loading = state.active_condition.is_loading() || state.claimed_supply.is_loading();

        let image = if data_loading {
            Slot::Loading
        } else {
            state
                .token_metadata
                .data()
                .and_then(|m| m.image.clone())
                .or_else(|| state.contract_metadata.data().and_then(|m| m.image.clone()))
                .filter(|uri| !uri.is_empty())
                .map_or(Slot::Hidden, Slot::Shown)
        };

        let supply = if data_loading {
            Slot::Loading
        } else {
            Slot::Shown(eligibility.supply.label())
        };

        let (title, description) = match &state.contract_metadata {
            Fetch::Loading => (Slot::Loading, Slot::Loading),
            Fetch::Ready(meta) | Fetch::Refreshing(meta) => (
                Slot::Shown(meta.name.clone()),
                meta.description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .map_or(Slot::Hidden, Slot::Shown),
            ),
            _ => (Slot::Hidden, Slot::Hidden),
        };

        let claim = if eligibility.state.is_terminal() {
            ClaimArea::Message {
                text: eligibility.button_text.clone(),
            }
        } else {
            let sold_out = eligibility.is_sold_out;
            // A cached sold-out reading is not shown while claim data reloads.
            let show_sold_out =
                sold_out && !(state.active_condition.is_fetching() || state.claimed_supply.is_fetching());
            ClaimArea::Controls {
                stepper: Stepper {
                    value: (!show_sold_out).then_some(quantity),
                    label: if show_sold_out {
                        TEXT_SOLD_OUT.to_string()
                    } else {
                        quantity.to_string()
                    },
                    can_decrement: can_decrement(quantity, sold_out),
                    can_increment: can_increment(quantity, eligibility.max_claimable, sold_out),
                },
                button: Button {
                    text: eligibility.button_text.clone(),
                    disabled: eligibility.button_disabled(),
                    loading: eligibility.button_loading,
                    color: config.primary_color.clone(),
                },
            }
        };

        WidgetView::Drop(Box::new(DropView {
            theme: config.theme,
            chain: config.chain.name.clone(),
            contract,
            token_id: config.token_id.to_string(),
            wallet: state.wallet.clone(),
            image,
            supply,
            title,
            description,
            claim,
            eligibility,
        }))
    }
}
