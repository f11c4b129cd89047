//! Contract bindings for DropERC1155-style contracts.

use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct ClaimCondition {
        uint256 startTimestamp;
        uint256 maxClaimableSupply;
        uint256 supplyClaimed;
        uint256 quantityLimitPerWallet;
        bytes32 merkleRoot;
        uint256 pricePerToken;
        address currency;
        string metadata;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct AllowlistProof {
        bytes32[] proof;
        uint256 quantityLimitPerWallet;
        uint256 pricePerToken;
        address currency;
    }

    interface IDropERC1155 {
        function claimCondition(uint256 tokenId) external view returns (uint256 currentStartId, uint256 count);
        function getActiveClaimConditionId(uint256 tokenId) external view returns (uint256);
        function getClaimConditionById(uint256 tokenId, uint256 conditionId) external view returns (ClaimCondition condition);
        function getSupplyClaimedByWallet(uint256 tokenId, uint256 conditionId, address claimer) external view returns (uint256);
        function totalSupply(uint256 id) external view returns (uint256);
        function contractURI() external view returns (string);
        function uri(uint256 tokenId) external view returns (string);
        function claim(
            address receiver,
            uint256 tokenId,
            uint256 quantity,
            address currency,
            uint256 pricePerToken,
            AllowlistProof allowlistProof,
            bytes data
        ) external payable;
    }

    interface IERC20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Address drop contracts use for the chain's native currency.
pub const NATIVE_TOKEN: Address = Address::new([0xEE; 20]);

pub fn is_native(currency: &Address) -> bool {
    *currency == NATIVE_TOKEN || *currency == Address::ZERO
}

/// Decimal string, with `uint256` max rendered as the SDK's "unlimited".
pub fn uint_string(value: U256) -> String {
    if value == U256::MAX {
        "unlimited".to_string()
    } else {
        value.to_string()
    }
}

/// Human-readable revert reason from raw revert data, if any.
pub fn revert_reason(data: &[u8]) -> Option<String> {
    alloy_sol_types::decode_revert_reason(data).filter(|r| !r.is_empty())
}
