use thiserror::Error;

/// Problems with the embed configuration. None of these are fatal: the shell
/// renders a static explanatory state instead of the widget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid embed URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid contract address: {0}")]
    InvalidContract(String),
    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),
    #[error("Invalid chain descriptor: {0}")]
    InvalidChain(String),
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}

/// Failures reported by a [`crate::sdk::DropSdk`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SdkError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object. `reason` holds the decoded revert string when
    /// the node returned revert data.
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        reason: Option<String>,
    },

    #[error("Transaction {tx_hash} reverted")]
    Reverted {
        tx_hash: String,
        reason: Option<String>,
    },

    #[error("Timed out waiting for transaction {0}")]
    Timeout(String),

    #[error("Failed to decode {what}: {detail}")]
    Decode { what: &'static str, detail: String },

    #[error("No wallet connected")]
    NoWallet,

    #[error("Metadata unavailable: {0}")]
    Metadata(String),

    #[error("Invalid allow-list snapshot: {0}")]
    Snapshot(String),
}

impl SdkError {
    /// Human-readable reason carried by the error, if the error shape has one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            SdkError::Rpc { reason, .. } | SdkError::Reverted { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// The node executed the call and the contract reverted it. Node and
    /// transport failures are not reverts.
    pub fn is_revert(&self) -> bool {
        match self {
            SdkError::Rpc { code, message, .. } => {
                *code == EXECUTION_REVERTED || message.to_ascii_lowercase().contains("execution reverted")
            }
            SdkError::Reverted { .. } => true,
            _ => false,
        }
    }
}

/// JSON-RPC error code nodes use for `eth_call` reverts.
pub const EXECUTION_REVERTED: i64 = 3;
