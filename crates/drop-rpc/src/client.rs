//! [`DropSdk`] over Ethereum JSON-RPC.
//!
//! Reads go to the chain RPC. Account access and transactions go to the
//! wallet endpoint, which signs on the user's behalf; this client never sees
//! keys.

use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use alloy_primitives::{hex, Address, U256};
use alloy_sol_types::SolCall;
use claim_core::chain::Chain;
use claim_core::ineligibility::IneligibilityReason;
use claim_core::types::{
    ClaimCondition, ClaimerProof, ContractMetadata, CurrencyValue, TokenId, TokenMetadata,
};
use claim_core::{DropSdk, Gasless, SdkError, WidgetConfig};
use serde_json::json;

use crate::abi::{self, is_native, uint_string, IDropERC1155, IERC20};
use crate::metadata::{fetch_json, resolve_uri, DEFAULT_IPFS_GATEWAY};
use crate::rpc::RpcClient;
use crate::snapshot::{empty_proof, Snapshot};

const RECEIPT_POLL: Duration = Duration::from_secs(1);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Default)]
pub struct ClientOptions {
    /// Wallet endpoint; defaults to the chain RPC.
    pub wallet_rpc: Option<String>,
    pub allowlist: Option<Snapshot>,
    pub ipfs_gateway: Option<String>,
}

pub struct DropClient {
    chain_rpc: RpcClient,
    wallet_rpc: RpcClient,
    contract: Address,
    chain: Chain,
    allowlist: Option<Snapshot>,
    gateway: String,
    wallet: Option<Address>,
}

/// A condition as stored on chain, with its id.
struct Phase {
    id: U256,
    condition: abi::ClaimCondition,
}

fn decode_err(what: &'static str) -> impl Fn(alloy_sol_types::Error) -> SdkError {
    move |e| SdkError::Decode {
        what,
        detail: e.to_string(),
    }
}

fn token_u256(token: &TokenId) -> Result<U256, SdkError> {
    U256::from_str(&token.to_string()).map_err(|e| SdkError::Decode {
        what: "token id",
        detail: e.to_string(),
    })
}

fn read_at<C: SolCall>(rpc: &RpcClient, to: Address, call: C, what: &'static str) -> Result<C::Return, SdkError> {
    let out = rpc.call(to, call.abi_encode(), None)?;
    C::abi_decode_returns(&out).map_err(decode_err(what))
}

fn parse_wallet(wallet: &str) -> Result<Address, SdkError> {
    Address::from_str(wallet).map_err(|e| SdkError::Decode {
        what: "wallet address",
        detail: e.to_string(),
    })
}

impl DropClient {
    pub fn new(config: &WidgetConfig, options: ClientOptions) -> Result<Self, SdkError> {
        let contract = config
            .contract
            .as_deref()
            .ok_or_else(|| SdkError::Transport("no contract address".to_string()))?;
        let contract = parse_wallet(contract)?;
        let chain_url = config
            .chain
            .rpc_url()
            .ok_or_else(|| SdkError::Transport(format!("no rpc url for {}", config.chain.name)))?
            .to_string();
        let wallet_url = options.wallet_rpc.unwrap_or_else(|| chain_url.clone());

        match &config.gasless {
            Gasless::None => {}
            gasless => tracing::warn!(
                relay = gasless.label(),
                "gas sponsorship is configured; transactions are relayed by the wallet endpoint"
            ),
        }
        tracing::info!(
            chain = %config.chain.name,
            chain_id = config.chain.chain_id,
            contract = %contract,
            rpc = %chain_url,
            wallet_rpc = %wallet_url,
            "drop client ready"
        );

        let chain_rpc = RpcClient::new(chain_url);
        let native_decimals = config.chain.native_currency.decimals;
        let allowlist = options
            .allowlist
            .map(|snapshot| {
                snapshot.with_price_decimals(|currency| {
                    if is_native(&currency) {
                        Ok(native_decimals)
                    } else {
                        read_at(&chain_rpc, currency, IERC20::decimalsCall {}, "decimals")
                    }
                })
            })
            .transpose()?;

        Ok(Self {
            chain_rpc,
            wallet_rpc: RpcClient::new(wallet_url),
            contract,
            chain: config.chain.clone(),
            allowlist,
            gateway: options
                .ipfs_gateway
                .unwrap_or_else(|| DEFAULT_IPFS_GATEWAY.to_string()),
            wallet: None,
        })
    }

    fn read<C: SolCall>(&self, call: C, what: &'static str) -> Result<C::Return, SdkError> {
        read_at(&self.chain_rpc, self.contract, call, what)
    }

    fn read_erc20<C: SolCall>(&self, token: Address, call: C, what: &'static str) -> Result<C::Return, SdkError> {
        read_at(&self.chain_rpc, token, call, what)
    }

    fn phases(&self, token: U256) -> Result<Vec<Phase>, SdkError> {
        let range = self.read(IDropERC1155::claimConditionCall { tokenId: token }, "claimCondition")?;
        let start = range.currentStartId;
        let count: u64 = range.count.saturating_to();
        (0..count)
            .map(|i| {
                let id = start + U256::from(i);
                let condition = self.read(
                    IDropERC1155::getClaimConditionByIdCall {
                        tokenId: token,
                        conditionId: id,
                    },
                    "getClaimConditionById",
                )?;
                Ok(Phase { id, condition })
            })
            .collect()
    }

    fn active_phase(&self, token: U256) -> Result<Phase, SdkError> {
        let id = self.read(
            IDropERC1155::getActiveClaimConditionIdCall { tokenId: token },
            "getActiveClaimConditionId",
        )?;
        let condition = self.read(
            IDropERC1155::getClaimConditionByIdCall {
                tokenId: token,
                conditionId: id,
            },
            "getClaimConditionById",
        )?;
        Ok(Phase { id, condition })
    }

    fn currency(&self, currency: Address, price: U256) -> Result<CurrencyValue, SdkError> {
        if is_native(&currency) {
            return Ok(CurrencyValue {
                value: price.to_string(),
                decimals: Some(self.chain.native_currency.decimals),
                symbol: self.chain.native_currency.symbol.clone(),
            });
        }
        let decimals = self.read_erc20(currency, IERC20::decimalsCall {}, "decimals").ok();
        let symbol = self.read_erc20(currency, IERC20::symbolCall {}, "symbol")?;
        Ok(CurrencyValue {
            value: price.to_string(),
            decimals,
            symbol,
        })
    }

    /// Allow-list entry applies only when the snapshot matches the phase root.
    fn entitlement(&self, phase: &Phase, wallet: Address) -> Option<&crate::snapshot::SnapshotEntry> {
        let snapshot = self.allowlist.as_ref()?;
        if phase.condition.merkleRoot.is_zero() || snapshot.root() != phase.condition.merkleRoot {
            return None;
        }
        snapshot.entry(wallet)
    }

    fn to_condition(&self, phase: &Phase, wallet: Option<Address>) -> Result<ClaimCondition, SdkError> {
        let c = &phase.condition;
        let entry = wallet.and_then(|w| self.entitlement(phase, w));

        let per_wallet = match entry {
            Some(e) if e.is_unlimited() => "unlimited".to_string(),
            Some(e) => uint_string(e.quantity_limit()),
            None => uint_string(c.quantityLimitPerWallet),
        };
        let (price, currency) = match entry {
            Some(e) if e.price_override() != U256::MAX => (e.price_override(), e.currency()),
            _ => (c.pricePerToken, c.currency),
        };
        let available = if c.maxClaimableSupply == U256::MAX {
            "unlimited".to_string()
        } else {
            c.maxClaimableSupply.saturating_sub(c.supplyClaimed).to_string()
        };

        Ok(ClaimCondition {
            start_time: c.startTimestamp.saturating_to(),
            max_claimable_supply: uint_string(c.maxClaimableSupply),
            max_claimable_per_wallet: per_wallet,
            available_supply: available,
            currency: self.currency(currency, price)?,
        })
    }

    fn connected(&self) -> Result<Address, SdkError> {
        self.wallet.ok_or(SdkError::NoWallet)
    }

    /// ERC20 payment is pulled by the drop contract, so it needs an allowance
    /// covering `cost` before the claim goes out.
    fn ensure_allowance(&self, wallet: Address, currency: Address, cost: U256) -> Result<(), SdkError> {
        let allowance = self.read_erc20(
            currency,
            IERC20::allowanceCall {
                owner: wallet,
                spender: self.contract,
            },
            "allowance",
        )?;
        if allowance >= cost {
            return Ok(());
        }
        let data = IERC20::approveCall {
            spender: self.contract,
            amount: cost,
        }
        .abi_encode();
        let tx = json!({
            "from": wallet.to_checksum(None),
            "to": currency.to_checksum(None),
            "data": hex::encode_prefixed(&data),
            "value": "0x0",
        });
        tracing::info!(%currency, %allowance, amount = %cost, "approving currency spend");
        let tx_hash = self.wallet_rpc.send_transaction(tx)?;
        self.wait_for_receipt(&tx_hash)
    }

    fn wait_for_receipt(&self, tx_hash: &str) -> Result<(), SdkError> {
        let deadline = Instant::now() + RECEIPT_TIMEOUT;
        loop {
            if let Some(receipt) = self.chain_rpc.receipt(tx_hash)? {
                if receipt.succeeded() {
                    return Ok(());
                }
                return Err(SdkError::Reverted {
                    tx_hash: receipt.transaction_hash,
                    reason: None,
                });
            }
            if Instant::now() >= deadline {
                return Err(SdkError::Timeout(tx_hash.to_string()));
            }
            thread::sleep(RECEIPT_POLL);
        }
    }
}

impl DropSdk for DropClient {
    fn contract_metadata(&self) -> Result<ContractMetadata, SdkError> {
        let uri = self.read(IDropERC1155::contractURICall {}, "contractURI")?;
        let mut meta: ContractMetadata = fetch_json(&resolve_uri(&uri, None, &self.gateway))?;
        meta.image = meta.image.map(|i| resolve_uri(&i, None, &self.gateway));
        Ok(meta)
    }

    fn token_metadata(&self, token: &TokenId) -> Result<TokenMetadata, SdkError> {
        let id = token_u256(token)?;
        let uri = self.read(IDropERC1155::uriCall { tokenId: id }, "uri")?;
        let mut meta: TokenMetadata = fetch_json(&resolve_uri(&uri, Some(id), &self.gateway))?;
        meta.image = meta.image.map(|i| resolve_uri(&i, Some(id), &self.gateway));
        Ok(meta)
    }

    fn claimed_supply(&self, token: &TokenId) -> Result<String, SdkError> {
        let supply = self.read(IDropERC1155::totalSupplyCall { id: token_u256(token)? }, "totalSupply")?;
        Ok(supply.to_string())
    }

    fn active_claim_condition(
        &self,
        token: &TokenId,
        wallet: Option<&str>,
    ) -> Result<ClaimCondition, SdkError> {
        let wallet = wallet.map(parse_wallet).transpose()?;
        let phase = self.active_phase(token_u256(token)?)?;
        self.to_condition(&phase, wallet)
    }

    fn claim_conditions(&self, token: &TokenId) -> Result<Vec<ClaimCondition>, SdkError> {
        self.phases(token_u256(token)?)?
            .iter()
            .map(|phase| self.to_condition(phase, None))
            .collect()
    }

    fn claimer_proof(&self, token: &TokenId, wallet: &str) -> Result<Option<ClaimerProof>, SdkError> {
        let wallet = parse_wallet(wallet)?;
        let phase = self.active_phase(token_u256(token)?)?;
        Ok(self.entitlement(&phase, wallet).map(|entry| ClaimerProof {
            max_claimable: if entry.is_unlimited() {
                claim_core::constants::UNLIMITED_PROOF_SENTINEL.to_string()
            } else {
                entry.quantity_limit().to_string()
            },
        }))
    }

    fn ineligibility_reasons(
        &self,
        token: &TokenId,
        quantity: u32,
        wallet: &str,
    ) -> Result<Vec<IneligibilityReason>, SdkError> {
        let token = token_u256(token)?;
        let wallet = parse_wallet(wallet)?;
        let quantity = U256::from(quantity);

        let phases = self.phases(token)?;
        if phases.is_empty() {
            return Ok(vec![IneligibilityReason::NoClaimConditionSet]);
        }
        let phase = match self.active_phase(token) {
            Ok(phase) => phase,
            Err(e) if e.is_revert() => return Ok(vec![IneligibilityReason::NoActiveClaimPhase]),
            Err(e) => return Err(e),
        };
        let c = &phase.condition;
        let mut reasons = Vec::new();

        if c.maxClaimableSupply != U256::MAX
            && c.supplyClaimed.saturating_add(quantity) > c.maxClaimableSupply
        {
            reasons.push(IneligibilityReason::NotEnoughSupply);
        }

        let entry = self.entitlement(&phase, wallet);
        let limit = entry.map_or(c.quantityLimitPerWallet, |e| e.quantity_limit());
        if limit.is_zero() {
            reasons.push(if c.merkleRoot.is_zero() {
                IneligibilityReason::NoClaimConditionSet
            } else {
                IneligibilityReason::AddressNotAllowed
            });
            return Ok(reasons);
        }
        let claimed_by_wallet = self.read(
            IDropERC1155::getSupplyClaimedByWalletCall {
                tokenId: token,
                conditionId: phase.id,
                claimer: wallet,
            },
            "getSupplyClaimedByWallet",
        )?;
        if claimed_by_wallet.saturating_add(quantity) > limit {
            reasons.push(IneligibilityReason::ExceedsMaxClaimable);
        }

        let (price, currency) = match entry {
            Some(e) if e.price_override() != U256::MAX => (e.price_override(), e.currency()),
            _ => (c.pricePerToken, c.currency),
        };
        let cost = price.saturating_mul(quantity);
        if !cost.is_zero() {
            let balance = if is_native(&currency) {
                self.chain_rpc.balance(wallet)?
            } else {
                self.read_erc20(currency, IERC20::balanceOfCall { owner: wallet }, "balanceOf")?
            };
            if balance < cost {
                reasons.push(IneligibilityReason::NotEnoughTokens);
            }
        }
        Ok(reasons)
    }

    fn claim(&mut self, token: &TokenId, quantity: u32) -> Result<String, SdkError> {
        let wallet = self.connected()?;
        let token = token_u256(token)?;
        let phase = self.active_phase(token)?;
        let c = &phase.condition;

        let proof = self
            .entitlement(&phase, wallet)
            .and_then(|_| self.allowlist.as_ref()?.proof(wallet))
            .unwrap_or_else(empty_proof);
        let (price, currency) = if proof.pricePerToken != U256::MAX {
            (proof.pricePerToken, proof.currency)
        } else {
            (c.pricePerToken, c.currency)
        };
        let quantity = U256::from(quantity);
        let cost = price.saturating_mul(quantity);
        let value = if is_native(&currency) {
            cost
        } else {
            if !cost.is_zero() {
                self.ensure_allowance(wallet, currency, cost)?;
            }
            U256::ZERO
        };

        let data = IDropERC1155::claimCall {
            receiver: wallet,
            tokenId: token,
            quantity,
            currency,
            pricePerToken: price,
            allowlistProof: proof,
            data: Default::default(),
        }
        .abi_encode();

        let tx = json!({
            "from": wallet.to_checksum(None),
            "to": self.contract.to_checksum(None),
            "data": hex::encode_prefixed(&data),
            "value": format!("0x{value:x}"),
        });
        tracing::info!(wallet = %wallet, token = %token, quantity = %quantity, value = %value, "sending claim");
        let tx_hash = self.wallet_rpc.send_transaction(tx)?;
        tracing::info!(%tx_hash, "claim submitted");

        match self.wait_for_receipt(&tx_hash) {
            Err(SdkError::Reverted { tx_hash, .. }) => {
                // Replay the call to recover the revert reason.
                let reason = match self.chain_rpc.call(self.contract, data, Some(wallet)) {
                    Err(err) => err.reason().map(str::to_string),
                    Ok(_) => None,
                };
                Err(SdkError::Reverted { tx_hash, reason })
            }
            Err(e) => Err(e),
            Ok(()) => Ok(tx_hash),
        }
    }

    fn connect_wallet(&mut self) -> Result<String, SdkError> {
        let accounts = self.wallet_rpc.accounts()?;
        let account = accounts.first().copied().ok_or(SdkError::NoWallet)?;
        self.wallet = Some(account);
        tracing::info!(wallet = %account, "wallet connected");
        Ok(account.to_checksum(None))
    }

    fn wallet_address(&self) -> Option<String> {
        self.wallet.map(|w| w.to_checksum(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(query: &str) -> DropClient {
        let config = WidgetConfig::from_query(query).unwrap();
        DropClient::new(&config, ClientOptions::default()).unwrap()
    }

    fn phase(limit: u64, max_supply: U256, claimed: u64) -> Phase {
        Phase {
            id: U256::ZERO,
            condition: abi::ClaimCondition {
                startTimestamp: U256::from(100u64),
                maxClaimableSupply: max_supply,
                supplyClaimed: U256::from(claimed),
                quantityLimitPerWallet: U256::from(limit),
                merkleRoot: Default::default(),
                pricePerToken: U256::from(10u64).pow(U256::from(16u64)),
                currency: abi::NATIVE_TOKEN,
                metadata: String::new(),
            },
        }
    }

    const QUERY: &str = "contract=0x5FbDB2315678afecb367f032d93F642f64180aa3&network=localhost";

    #[test]
    fn test_condition_conversion() {
        let c = client(QUERY);
        let cond = c.to_condition(&phase(5, U256::from(100u64), 40), None).unwrap();
        assert_eq!(cond.start_time, 100);
        assert_eq!(cond.max_claimable_supply, "100");
        assert_eq!(cond.max_claimable_per_wallet, "5");
        assert_eq!(cond.available_supply, "60");
        assert_eq!(cond.currency.value, "10000000000000000");
        assert_eq!(cond.currency.symbol, "ETH");
        assert_eq!(cond.currency.decimals, Some(18));
    }

    #[test]
    fn test_unlimited_supply_conversion() {
        let c = client(QUERY);
        let cond = c.to_condition(&phase(1, U256::MAX, 3), None).unwrap();
        assert_eq!(cond.max_claimable_supply, "unlimited");
        assert_eq!(cond.available_supply, "unlimited");
    }

    #[test]
    fn test_claim_requires_wallet() {
        let mut c = client(QUERY);
        assert_eq!(c.wallet_address(), None);
        assert_eq!(c.claim(&TokenId::default(), 1), Err(SdkError::NoWallet));
    }

    #[test]
    fn test_missing_contract_rejected() {
        let config = WidgetConfig::from_query("network=localhost").unwrap();
        assert!(DropClient::new(&config, ClientOptions::default()).is_err());
    }

    #[test]
    fn test_snapshot_ignored_when_root_differs() {
        let snapshot = Snapshot::from_json(
            r#"[{"address": "0x00000000000000000000000000000000000000a1", "maxClaimable": "0"}]"#,
        )
        .unwrap();
        let config = WidgetConfig::from_query(QUERY).unwrap();
        let c = DropClient::new(
            &config,
            ClientOptions {
                allowlist: Some(snapshot),
                ..Default::default()
            },
        )
        .unwrap();
        let wallet = Address::from_str("0x00000000000000000000000000000000000000a1").unwrap();

        let mut p = phase(0, U256::from(10u64), 0);
        assert!(c.entitlement(&p, wallet).is_none());

        p.condition.merkleRoot = c.allowlist.as_ref().unwrap().root();
        let cond = c.to_condition(&p, Some(wallet)).unwrap();
        assert_eq!(cond.max_claimable_per_wallet, "unlimited");
    }
}
