use std::time::Duration;

/// Display ceiling for quantities and supplies. Anything at or above this is
/// rendered as "effectively unlimited".
pub const UNLIMITED_CAP: u32 = 1_000_000;

/// How long the stepper value must stay unchanged before it is used to
/// re-query quantity-dependent ineligibility reasons.
pub const QUANTITY_DEBOUNCE: Duration = Duration::from_millis(500);

/// Decimals assumed when the SDK reports a currency without them.
pub const DEFAULT_CURRENCY_DECIMALS: u8 = 18;

/// Allow-list proofs carry this value when the wallet may claim without limit.
pub const UNLIMITED_PROOF_SENTINEL: &str = "0";

pub const DEFAULT_TOKEN_ID: &str = "0";
pub const DEFAULT_NETWORK: &str = "ethereum";

/// Address used by drop contracts to denote the chain's native currency.
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

pub const SUCCESS_TOAST_SECS: u64 = 5;
pub const FAILURE_TOAST_SECS: u64 = 9;

// Button and terminal copy.
pub const TEXT_SOLD_OUT: &str = "Sold Out";
pub const TEXT_FREE_MINT: &str = "Mint (Free)";
pub const TEXT_CHECKING: &str = "Checking eligibility...";
pub const TEXT_UNAVAILABLE: &str = "Minting not available";
pub const TEXT_CONNECT_WALLET: &str = "Connect Wallet";
pub const TEXT_NOT_CONFIGURED: &str =
    "This drop is not ready to be minted yet. (No claim condition set)";
pub const TEXT_STARTING_SOON: &str = "Drop is starting soon. Please check back later.";
pub const TEXT_NO_CONTRACT: &str = "No contract address provided";
