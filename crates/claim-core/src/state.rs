//! Latest SDK signals for one widget session.
//!
//! The shell never reads the SDK directly: it issues [`Query`] values, runs
//! them (usually on a worker thread) and feeds the resulting [`Update`]s back
//! into [`DropState`].

use crate::eligibility::{resolve, Eligibility, EligibilityInputs};
use crate::errors::SdkError;
use crate::fetch::Fetch;
use crate::ineligibility::IneligibilityReason;
use crate::sdk::DropSdk;
use crate::types::{ClaimCondition, ClaimerProof, ContractMetadata, TokenId, TokenMetadata};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    ContractMetadata,
    TokenMetadata,
    ClaimedSupply,
    ClaimConditions,
    ActiveCondition,
    ClaimerProof,
    Ineligibility { quantity: u32 },
}

#[derive(Debug)]
pub enum Update {
    ContractMetadata(Result<ContractMetadata, SdkError>),
    TokenMetadata(Result<TokenMetadata, SdkError>),
    ClaimedSupply(Result<String, SdkError>),
    ClaimConditions(Result<Vec<ClaimCondition>, SdkError>),
    ActiveCondition(Result<ClaimCondition, SdkError>),
    ClaimerProof(Result<Option<ClaimerProof>, SdkError>),
    Ineligibility {
        quantity: u32,
        result: Result<Vec<IneligibilityReason>, SdkError>,
    },
}

impl Query {
    /// Every query the widget needs on load, given the wallet state.
    pub fn initial(wallet_connected: bool, quantity: u32) -> Vec<Query> {
        let mut queries = vec![
            Query::ContractMetadata,
            Query::TokenMetadata,
            Query::ClaimedSupply,
            Query::ClaimConditions,
            Query::ActiveCondition,
        ];
        queries.extend(Self::wallet_scoped(wallet_connected, quantity));
        queries
    }

    pub fn wallet_scoped(wallet_connected: bool, quantity: u32) -> Vec<Query> {
        if wallet_connected {
            vec![Query::ClaimerProof, Query::Ineligibility { quantity }]
        } else {
            Vec::new()
        }
    }

    /// What goes stale after a confirmed claim.
    pub fn after_claim(quantity: u32) -> Vec<Query> {
        vec![
            Query::ClaimedSupply,
            Query::ActiveCondition,
            Query::Ineligibility { quantity },
        ]
    }

    /// Blocking. `Ineligibility` and `ClaimerProof` without a wallet resolve to
    /// the SDK's "no wallet" answers instead of calling out.
    pub fn execute<S: DropSdk + ?Sized>(self, sdk: &S, token: &TokenId, wallet: Option<&str>) -> Update {
        match self {
            Query::ContractMetadata => Update::ContractMetadata(sdk.contract_metadata()),
            Query::TokenMetadata => Update::TokenMetadata(sdk.token_metadata(token)),
            Query::ClaimedSupply => Update::ClaimedSupply(sdk.claimed_supply(token)),
            Query::ClaimConditions => Update::ClaimConditions(sdk.claim_conditions(token)),
            Query::ActiveCondition => Update::ActiveCondition(sdk.active_claim_condition(token, wallet)),
            Query::ClaimerProof => Update::ClaimerProof(match wallet {
                Some(w) => sdk.claimer_proof(token, w),
                None => Ok(None),
            }),
            Query::Ineligibility { quantity } => Update::Ineligibility {
                quantity,
                result: match wallet {
                    Some(w) => sdk.ineligibility_reasons(token, quantity, w),
                    None => Ok(vec![IneligibilityReason::NoWallet]),
                },
            },
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DropState {
    pub contract_metadata: Fetch<ContractMetadata>,
    pub token_metadata: Fetch<TokenMetadata>,
    pub claimed_supply: Fetch<String>,
    pub claim_conditions: Fetch<Vec<ClaimCondition>>,
    pub active_condition: Fetch<ClaimCondition>,
    pub claimer_proof: Fetch<Option<ClaimerProof>>,
    pub ineligibility: Fetch<Vec<IneligibilityReason>>,
    pub wallet: Option<String>,
    /// Quantity of the newest ineligibility query; older answers are dropped.
    ineligibility_quantity: Option<u32>,
}

impl DropState {
    pub fn begin(&mut self, query: Query) {
        match query {
            Query::ContractMetadata => self.contract_metadata.begin(),
            Query::TokenMetadata => self.token_metadata.begin(),
            Query::ClaimedSupply => self.claimed_supply.begin(),
            Query::ClaimConditions => self.claim_conditions.begin(),
            Query::ActiveCondition => self.active_condition.begin(),
            Query::ClaimerProof => self.claimer_proof.begin(),
            Query::Ineligibility { quantity } => {
                self.ineligibility_quantity = Some(quantity);
                self.ineligibility.begin();
            }
        }
    }

    /// Returns false when the update was stale and ignored.
    pub fn apply(&mut self, update: Update) -> bool {
        match update {
            Update::ContractMetadata(r) => self.contract_metadata.settle(r),
            Update::TokenMetadata(r) => self.token_metadata.settle(r),
            Update::ClaimedSupply(r) => self.claimed_supply.settle(r),
            Update::ClaimConditions(r) => self.claim_conditions.settle(r),
            Update::ActiveCondition(r) => self.active_condition.settle(r),
            Update::ClaimerProof(r) => self.claimer_proof.settle(r),
            Update::Ineligibility { quantity, result } => {
                if self
                    .ineligibility_quantity
                    .map_or(false, |latest| latest != quantity)
                {
                    tracing::debug!(quantity, "dropping stale ineligibility result");
                    return false;
                }
                self.ineligibility.settle(result);
            }
        }
        true
    }

    /// Records the connected wallet and clears wallet-scoped signals. Returns
    /// the queries to re-run.
    pub fn connect(&mut self, address: String, quantity: u32) -> Vec<Query> {
        self.wallet = Some(address);
        self.claimer_proof = Fetch::Idle;
        self.ineligibility = Fetch::Idle;
        self.ineligibility_quantity = None;
        let mut queries = vec![Query::ActiveCondition];
        queries.extend(Query::wallet_scoped(true, quantity));
        queries
    }

    pub fn wallet_connected(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn eligibility(&self, quantity: u32, now: u64) -> Eligibility {
        resolve(&EligibilityInputs {
            claim_conditions: &self.claim_conditions,
            active_condition: &self.active_condition,
            claimer_proof: &self.claimer_proof,
            ineligibility: &self.ineligibility,
            claimed_supply: &self.claimed_supply,
            reasons_quantity: self.ineligibility_quantity,
            wallet_connected: self.wallet_connected(),
            quantity,
            now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_queries_skip_wallet_scoped_without_wallet() {
        let q = Query::initial(false, 1);
        assert_eq!(q.len(), 5);
        assert!(!q.contains(&Query::ClaimerProof));

        let q = Query::initial(true, 3);
        assert!(q.contains(&Query::Ineligibility { quantity: 3 }));
    }

    #[test]
    fn test_stale_ineligibility_is_dropped() {
        let mut state = DropState::default();
        state.begin(Query::Ineligibility { quantity: 2 });
        state.begin(Query::Ineligibility { quantity: 3 });

        let applied = state.apply(Update::Ineligibility {
            quantity: 2,
            result: Ok(vec![IneligibilityReason::ExceedsMaxClaimable]),
        });
        assert!(!applied);
        assert!(state.ineligibility.is_loading());

        assert!(state.apply(Update::Ineligibility {
            quantity: 3,
            result: Ok(vec![]),
        }));
        assert_eq!(state.ineligibility, Fetch::Ready(vec![]));
    }

    #[test]
    fn test_refetch_keeps_previous_value() {
        let mut state = DropState::default();
        state.begin(Query::ClaimedSupply);
        state.apply(Update::ClaimedSupply(Ok("4".into())));
        state.begin(Query::ClaimedSupply);
        assert_eq!(state.claimed_supply, Fetch::Refreshing("4".into()));
        assert!(state.claimed_supply.is_fetching());
    }

    #[test]
    fn test_failed_fetch_records_message() {
        let mut state = DropState::default();
        state.begin(Query::ActiveCondition);
        state.apply(Update::ActiveCondition(Err(SdkError::Transport("refused".into()))));
        assert_eq!(
            state.active_condition,
            Fetch::Failed("RPC transport error: refused".into())
        );
    }

    #[test]
    fn test_connect_resets_wallet_scoped_signals() {
        let mut state = DropState::default();
        state.ineligibility = Fetch::Ready(vec![IneligibilityReason::NoWallet]);
        let queries = state.connect("0xabc".into(), 1);
        assert!(state.wallet_connected());
        assert_eq!(state.ineligibility, Fetch::Idle);
        assert_eq!(
            queries,
            vec![
                Query::ActiveCondition,
                Query::ClaimerProof,
                Query::Ineligibility { quantity: 1 }
            ]
        );
    }
}
