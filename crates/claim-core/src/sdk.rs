use crate::errors::SdkError;
use crate::ineligibility::IneligibilityReason;
use crate::types::{ClaimCondition, ClaimerProof, ContractMetadata, TokenId, TokenMetadata};

/// Wallet and contract capabilities the widget consumes.
///
/// Implementations may block; the interactive shell only calls them from its
/// worker thread.
pub trait DropSdk: Send {
    fn contract_metadata(&self) -> Result<ContractMetadata, SdkError>;

    fn token_metadata(&self, token: &TokenId) -> Result<TokenMetadata, SdkError>;

    /// Circulating supply of `token`, as a raw integer string.
    fn claimed_supply(&self, token: &TokenId) -> Result<String, SdkError>;

    /// Active claim condition. With a wallet, per-wallet overrides from the
    /// allow-list are applied to the limits.
    fn active_claim_condition(
        &self,
        token: &TokenId,
        wallet: Option<&str>,
    ) -> Result<ClaimCondition, SdkError>;

    fn claim_conditions(&self, token: &TokenId) -> Result<Vec<ClaimCondition>, SdkError>;

    /// `Ok(None)` when the wallet is not on the allow-list (or there is none).
    fn claimer_proof(&self, token: &TokenId, wallet: &str) -> Result<Option<ClaimerProof>, SdkError>;

    fn ineligibility_reasons(
        &self,
        token: &TokenId,
        quantity: u32,
        wallet: &str,
    ) -> Result<Vec<IneligibilityReason>, SdkError>;

    /// Submits the claim for the connected wallet and waits for inclusion.
    /// Returns the transaction hash.
    fn claim(&mut self, token: &TokenId, quantity: u32) -> Result<String, SdkError>;

    /// Returns the connected address.
    fn connect_wallet(&mut self) -> Result<String, SdkError>;

    fn wallet_address(&self) -> Option<String>;
}

impl<S: DropSdk + ?Sized> DropSdk for Box<S> {
    fn contract_metadata(&self) -> Result<ContractMetadata, SdkError> {
        (**self).contract_metadata()
    }

    fn token_metadata(&self, token: &TokenId) -> Result<TokenMetadata, SdkError> {
        (**self).token_metadata(token)
    }

    fn claimed_supply(&self, token: &TokenId) -> Result<String, SdkError> {
        (**self).claimed_supply(token)
    }

    fn active_claim_condition(
        &self,
        token: &TokenId,
        wallet: Option<&str>,
    ) -> Result<ClaimCondition, SdkError> {
        (**self).active_claim_condition(token, wallet)
    }

    fn claim_conditions(&self, token: &TokenId) -> Result<Vec<ClaimCondition>, SdkError> {
        (**self).claim_conditions(token)
    }

    fn claimer_proof(&self, token: &TokenId, wallet: &str) -> Result<Option<ClaimerProof>, SdkError> {
        (**self).claimer_proof(token, wallet)
    }

    fn ineligibility_reasons(
        &self,
        token: &TokenId,
        quantity: u32,
        wallet: &str,
    ) -> Result<Vec<IneligibilityReason>, SdkError> {
        (**self).ineligibility_reasons(token, quantity, wallet)
    }

    fn claim(&mut self, token: &TokenId, quantity: u32) -> Result<String, SdkError> {
        (**self).claim(token, quantity)
    }

    fn connect_wallet(&mut self) -> Result<String, SdkError> {
        (**self).connect_wallet()
    }

    fn wallet_address(&self) -> Option<String> {
        (**self).wallet_address()
    }
}
