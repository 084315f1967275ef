//! Typed call descriptors for the contracts the gateway talks about
//!
//! Only the read surface of the claim contract is ever executed (via
//! `eth_call`). The token write functions are encoded, never sent: they back
//! the calldata included in wrap/unwrap instructions.

use alloy_sol_types::sol;

sol! {
    /// Merkle distribution contract
    interface IMerkleClaim {
        function isClaimEnabled() external view returns (bool);
        function hasClaimed(address account) external view returns (bool);
        function getClaimableAmount(address account, uint256 amount, bytes32[] proof) external view returns (uint256);
        function getStats() external view returns (uint256 totalAllocated, uint256 totalClaimed, uint256 remainingAllocated, uint256 contractBalance);
    }

    /// Balance read shared by the legacy and wrapped tokens
    interface IERC20Balance {
        function balanceOf(address account) external view returns (uint256);
    }

    /// Legacy token: wrapping goes through approveAndCall on the wrapper
    interface ILegacyToken {
        function approveAndCall(address spender, uint256 value) external returns (bool success);
    }

    interface IWrappedToken {
        function unwrap(uint256 value) external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};
    use alloy_sol_types::SolCall;

    #[test]
    fn test_selectors() {
        assert_eq!(IERC20Balance::balanceOfCall::SIGNATURE, "balanceOf(address)");
        assert_eq!(IERC20Balance::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(
            IMerkleClaim::getClaimableAmountCall::SIGNATURE,
            "getClaimableAmount(address,uint256,bytes32[])"
        );
        assert_eq!(IWrappedToken::unwrapCall::SIGNATURE, "unwrap(uint256)");
    }

    #[test]
    fn test_claimable_call_carries_proof() {
        let call = IMerkleClaim::getClaimableAmountCall {
            account: Address::repeat_byte(0x11),
            amount: U256::from(100),
            proof: vec![B256::repeat_byte(0x01), B256::repeat_byte(0x02)],
        };
        let encoded = call.abi_encode();
        // selector + account + amount + offset + length + 2 nodes
        assert_eq!(encoded.len(), 4 + 32 * 6);

        let decoded = IMerkleClaim::getClaimableAmountCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.proof, call.proof);
    }
}
