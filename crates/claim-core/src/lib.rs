//! Claim logic for ERC1155 drop widgets: configuration, eligibility
//! resolution, supply counters, quantity bounds and the claim dispatcher.
//!
//! Chain access lives behind [`sdk::DropSdk`].

pub mod amount;
pub mod chain;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod dispatch;
pub mod eligibility;
pub mod errors;
pub mod fetch;
pub mod ineligibility;
pub mod quantity;
pub mod sdk;
pub mod state;
pub mod supply;
pub mod theme;
pub mod types;
pub mod view;

pub use config::{Gasless, WidgetConfig};
pub use dispatch::{dispatch, dispatch_checked, Notification};
pub use eligibility::{resolve, Eligibility, EligibilityState};
pub use errors::{ConfigError, SdkError};
pub use fetch::Fetch;
pub use sdk::DropSdk;
pub use state::{DropState, Query, Update};
pub use types::TokenId;
pub use view::WidgetView;
