//! Drives `DropClient` against an in-process JSON-RPC stub.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy_primitives::{hex, Address, U256};
use alloy_sol_types::{SolCall, SolValue};
use claim_core::ineligibility::IneligibilityReason;
use claim_core::{DropSdk, SdkError, TokenId, WidgetConfig};
use drop_rpc::abi::{self, IDropERC1155, IERC20};
use drop_rpc::{ClientOptions, DropClient};
use serde_json::{json, Value};

/// Serves JSON-RPC over HTTP/1.1, one request per connection. Returns the
/// base URL and the log of called methods.
fn serve<F>(handler: F) -> (String, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str, &Value) -> Value + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = log.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    break;
                }
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            if reader.read_exact(&mut body).is_err() {
                continue;
            }
            let request: Value = serde_json::from_slice(&body).unwrap();
            let method = request["method"].as_str().unwrap_or_default().to_string();
            seen.lock().unwrap().push(method.clone());
            let mut reply = handler(&method, &request["params"]);
            reply["jsonrpc"] = json!("2.0");
            reply["id"] = request["id"].clone();
            let payload = reply.to_string();
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                payload.len(),
                payload
            );
        }
    });
    (url, log)
}

const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const WALLET: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const USDC: &str = "0x00000000000000000000000000000000000000e2";

fn config(url: &str) -> WidgetConfig {
    let chain = json!({
        "chainId": 31337,
        "name": "Anvil",
        "rpc": [url],
        "nativeCurrency": {"name": "Ether", "symbol": "ETH", "decimals": 18}
    });
    let query = format!("contract={CONTRACT}&chain={}", urlencode(&chain.to_string()));
    WidgetConfig::from_query(&query).unwrap()
}

fn urlencode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

fn ok(result: Value) -> Value {
    json!({ "result": result })
}

fn encoded(bytes: Vec<u8>) -> Value {
    json!(hex::encode_prefixed(bytes))
}

fn condition() -> abi::ClaimCondition {
    abi::ClaimCondition {
        startTimestamp: U256::from(1u64),
        maxClaimableSupply: U256::from(100u64),
        supplyClaimed: U256::from(25u64),
        quantityLimitPerWallet: U256::from(3u64),
        merkleRoot: Default::default(),
        pricePerToken: U256::ZERO,
        currency: abi::NATIVE_TOKEN,
        metadata: String::new(),
    }
}

/// Chain state the stub answers from.
#[derive(Clone)]
struct Ledger {
    condition: abi::ClaimCondition,
    claimed_by_wallet: u64,
    /// Wallet balance, native and ERC20 alike.
    balance: U256,
    allowance: U256,
    /// Error object returned for `getActiveClaimConditionId`.
    active_error: Option<Value>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            condition: condition(),
            claimed_by_wallet: 0,
            balance: U256::from(10u64).pow(U256::from(18u64)),
            allowance: U256::ZERO,
            active_error: None,
        }
    }
}

impl Ledger {
    fn answer(&self, method: &str, params: &Value) -> Option<Value> {
        match method {
            "eth_getBalance" => return Some(ok(json!(format!("0x{:x}", self.balance)))),
            "eth_call" => {}
            _ => return None,
        }
        let data = hex::decode(params[0]["data"].as_str()?).ok()?;
        let selector: [u8; 4] = data.get(..4)?.try_into().ok()?;
        let out = if selector == IDropERC1155::totalSupplyCall::SELECTOR {
            U256::from(25u64).abi_encode()
        } else if selector == IDropERC1155::getActiveClaimConditionIdCall::SELECTOR {
            if let Some(error) = &self.active_error {
                return Some(json!({ "error": error }));
            }
            U256::ZERO.abi_encode()
        } else if selector == IDropERC1155::getClaimConditionByIdCall::SELECTOR {
            (self.condition.clone(),).abi_encode_params()
        } else if selector == IDropERC1155::claimConditionCall::SELECTOR {
            (U256::ZERO, U256::from(1u64)).abi_encode_params()
        } else if selector == IDropERC1155::getSupplyClaimedByWalletCall::SELECTOR {
            U256::from(self.claimed_by_wallet).abi_encode()
        } else if selector == IERC20::balanceOfCall::SELECTOR {
            self.balance.abi_encode()
        } else if selector == IERC20::allowanceCall::SELECTOR {
            self.allowance.abi_encode()
        } else {
            return None;
        };
        Some(ok(encoded(out)))
    }
}

/// Answers the drop reads every test needs.
fn drop_reads(method: &str, params: &Value) -> Option<Value> {
    Ledger::default().answer(method, params)
}

fn not_found() -> Value {
    json!({"error": {"code": -32601, "message": "nope"}})
}

fn reasons(ledger: Ledger, quantity: u32) -> Result<Vec<IneligibilityReason>, SdkError> {
    let (url, _) = serve(move |method, params| ledger.answer(method, params).unwrap_or_else(not_found));
    let client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    client.ineligibility_reasons(&TokenId::default(), quantity, WALLET)
}

/// Wallet endpoint that records every transaction it is asked to send.
fn wallet_node(ledger: Ledger) -> (String, Arc<Mutex<Vec<Value>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let captured = sent.clone();
    let (url, _) = serve(move |method, params| {
        if let Some(reply) = ledger.answer(method, params) {
            return reply;
        }
        match method {
            "eth_requestAccounts" => ok(json!([WALLET])),
            "eth_sendTransaction" => {
                let mut txs = captured.lock().unwrap();
                txs.push(params[0].clone());
                ok(json!(format!("0x{:064x}", txs.len())))
            }
            "eth_getTransactionReceipt" => ok(json!({
                "transactionHash": params[0].clone(),
                "status": "0x1"
            })),
            _ => not_found(),
        }
    });
    (url, sent)
}

fn usdc_ledger(price: u64) -> Ledger {
    let mut ledger = Ledger::default();
    ledger.condition.currency = USDC.parse().unwrap();
    ledger.condition.pricePerToken = U256::from(price);
    ledger
}

#[test]
fn test_reads_supply_and_condition() {
    let (url, _) = serve(|method, params| {
        drop_reads(method, params).unwrap_or_else(|| json!({"error": {"code": -32601, "message": "nope"}}))
    });
    let client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    let token = TokenId::default();

    assert_eq!(client.claimed_supply(&token).unwrap(), "25");

    let active = client.active_claim_condition(&token, None).unwrap();
    assert_eq!(active.available_supply, "75");
    assert_eq!(active.max_claimable_per_wallet, "3");
    assert_eq!(active.currency.symbol, "ETH");

    let all = client.claim_conditions(&token).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn test_connect_falls_back_to_eth_accounts() {
    let (url, log) = serve(|method, _| match method {
        "eth_requestAccounts" => json!({"error": {"code": -32601, "message": "method not found"}}),
        "eth_accounts" => ok(json!([WALLET])),
        _ => json!({"error": {"code": -32601, "message": "nope"}}),
    });
    let mut client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    let address = client.connect_wallet().unwrap();
    assert_eq!(address.parse::<Address>().unwrap(), WALLET.parse::<Address>().unwrap());
    assert_eq!(client.wallet_address(), Some(address));
    assert_eq!(
        *log.lock().unwrap(),
        vec!["eth_requestAccounts".to_string(), "eth_accounts".to_string()]
    );
}

#[test]
fn test_claim_submits_and_waits_for_receipt() {
    let sent = Arc::new(Mutex::new(None::<Value>));
    let captured = sent.clone();
    let (url, _) = serve(move |method, params| {
        if let Some(reply) = drop_reads(method, params) {
            return reply;
        }
        match method {
            "eth_requestAccounts" => ok(json!([WALLET])),
            "eth_sendTransaction" => {
                *captured.lock().unwrap() = Some(params[0].clone());
                ok(json!(format!("0x{}", "ab".repeat(32))))
            }
            "eth_getTransactionReceipt" => ok(json!({
                "transactionHash": format!("0x{}", "ab".repeat(32)),
                "status": "0x1"
            })),
            _ => json!({"error": {"code": -32601, "message": "nope"}}),
        }
    });
    let mut client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    client.connect_wallet().unwrap();

    let tx_hash = client.claim(&TokenId::default(), 2).unwrap();
    assert_eq!(tx_hash.len(), 66);

    let tx = sent.lock().unwrap().clone().unwrap();
    assert_eq!(tx["value"], "0x0");
    let data = hex::decode(tx["data"].as_str().unwrap()).unwrap();
    let call = IDropERC1155::claimCall::abi_decode(&data).unwrap();
    assert_eq!(call.quantity, U256::from(2u64));
    assert_eq!(call.receiver, WALLET.parse::<Address>().unwrap());
    assert!(call.allowlistProof.proof.is_empty());
}

#[test]
fn test_rpc_revert_carries_reason() {
    let (url, _) = serve(|method, _| match method {
        "eth_call" => json!({"error": {"code": 3, "message": "execution reverted: !CONDITION"}}),
        _ => json!({"error": {"code": -32601, "message": "nope"}}),
    });
    let client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    let err = client
        .active_claim_condition(&TokenId::default(), None)
        .unwrap_err();
    assert!(matches!(err, SdkError::Rpc { code: 3, .. }));
    assert_eq!(err.reason(), Some("!CONDITION"));
}

#[test]
fn test_reasons_empty_when_eligible() {
    assert!(reasons(Ledger::default(), 2).unwrap().is_empty());
}

#[test]
fn test_reasons_not_enough_supply() {
    let mut ledger = Ledger::default();
    ledger.condition.supplyClaimed = U256::from(99u64);
    assert_eq!(reasons(ledger, 2).unwrap(), vec![IneligibilityReason::NotEnoughSupply]);
}

#[test]
fn test_reasons_wallet_limit_counts_past_claims() {
    let mut ledger = Ledger::default();
    ledger.claimed_by_wallet = 2;
    assert!(reasons(ledger.clone(), 1).unwrap().is_empty());
    assert_eq!(
        reasons(ledger, 2).unwrap(),
        vec![IneligibilityReason::ExceedsMaxClaimable]
    );
}

#[test]
fn test_reasons_gated_phase_without_allowlist_entry() {
    let mut ledger = Ledger::default();
    ledger.condition.merkleRoot = [7u8; 32].into();
    ledger.condition.quantityLimitPerWallet = U256::ZERO;
    assert_eq!(
        reasons(ledger, 1).unwrap(),
        vec![IneligibilityReason::AddressNotAllowed]
    );
}

#[test]
fn test_reasons_native_balance_too_low() {
    let mut ledger = Ledger::default();
    ledger.condition.pricePerToken = U256::from(10u64).pow(U256::from(16u64));
    ledger.balance = U256::from(10u64).pow(U256::from(16u64));
    assert!(reasons(ledger.clone(), 1).unwrap().is_empty());
    assert_eq!(
        reasons(ledger, 2).unwrap(),
        vec![IneligibilityReason::NotEnoughTokens]
    );
}

#[test]
fn test_reasons_erc20_balance_too_low() {
    let mut ledger = usdc_ledger(1_000_000);
    ledger.balance = U256::from(1_500_000u64);
    assert_eq!(
        reasons(ledger, 2).unwrap(),
        vec![IneligibilityReason::NotEnoughTokens]
    );
}

#[test]
fn test_reasons_no_active_phase_on_revert() {
    let mut ledger = Ledger::default();
    ledger.active_error = Some(json!({"code": 3, "message": "execution reverted: !CONDITION"}));
    assert_eq!(
        reasons(ledger, 1).unwrap(),
        vec![IneligibilityReason::NoActiveClaimPhase]
    );
}

#[test]
fn test_reasons_propagate_node_failures() {
    let mut ledger = Ledger::default();
    ledger.active_error = Some(json!({"code": -32000, "message": "header not found"}));
    let err = reasons(ledger, 1).unwrap_err();
    assert!(matches!(err, SdkError::Rpc { code: -32000, .. }));
}

#[test]
fn test_erc20_claim_approves_before_claiming() {
    let (url, sent) = wallet_node(usdc_ledger(1_000_000));
    let mut client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    client.connect_wallet().unwrap();
    client.claim(&TokenId::default(), 2).unwrap();

    let txs = sent.lock().unwrap().clone();
    assert_eq!(txs.len(), 2);
    let usdc: Address = USDC.parse().unwrap();
    let contract: Address = CONTRACT.parse().unwrap();

    assert_eq!(txs[0]["to"].as_str().unwrap().parse::<Address>().unwrap(), usdc);
    let approve = IERC20::approveCall::abi_decode(&hex::decode(txs[0]["data"].as_str().unwrap()).unwrap()).unwrap();
    assert_eq!(approve.spender, contract);
    assert_eq!(approve.amount, U256::from(2_000_000u64));

    assert_eq!(txs[1]["to"].as_str().unwrap().parse::<Address>().unwrap(), contract);
    assert_eq!(txs[1]["value"], "0x0");
    let claim = IDropERC1155::claimCall::abi_decode(&hex::decode(txs[1]["data"].as_str().unwrap()).unwrap()).unwrap();
    assert_eq!(claim.currency, usdc);
    assert_eq!(claim.pricePerToken, U256::from(1_000_000u64));
}

#[test]
fn test_erc20_claim_reuses_existing_allowance() {
    let mut ledger = usdc_ledger(1_000_000);
    ledger.allowance = U256::from(5_000_000u64);
    let (url, sent) = wallet_node(ledger);
    let mut client = DropClient::new(&config(&url), ClientOptions::default()).unwrap();
    client.connect_wallet().unwrap();
    client.claim(&TokenId::default(), 2).unwrap();

    let txs = sent.lock().unwrap().clone();
    assert_eq!(txs.len(), 1);
    assert_eq!(
        txs[0]["to"].as_str().unwrap().parse::<Address>().unwrap(),
        CONTRACT.parse::<Address>().unwrap()
    );
}
