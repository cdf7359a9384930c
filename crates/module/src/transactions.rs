//! Unsigned transaction descriptors for the auction house.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use serde_json::json;

use auction_types::abi::IAuction;
use auction_types::TransactionRequest;

use crate::config::FrameConfig;

/// `settleCurrentAndCreateNewAuction()` with no value attached.
pub fn settle_transaction(config: &FrameConfig) -> TransactionRequest {
    let data = IAuction::settleCurrentAndCreateNewAuctionCall {}.abi_encode();

    TransactionRequest::new(
        config.chain_id,
        json!([{
            "type": "function",
            "name": "settleCurrentAndCreateNewAuction",
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
        }]),
        config.auction_address,
        Bytes::from(data),
        None,
    )
}

/// `createBidWithReferral(tokenId, referral)` paying `value` wei.
pub fn bid_transaction(config: &FrameConfig, token_id: U256, value: U256) -> TransactionRequest {
    let data = IAuction::createBidWithReferralCall {
        tokenId: token_id,
        referral: config.referral,
    }
    .abi_encode();

    TransactionRequest::new(
        config.chain_id,
        json!([{
            "type": "function",
            "name": "createBidWithReferral",
            "inputs": [
                { "name": "tokenId", "type": "uint256", "internalType": "uint256" },
                { "name": "referral", "type": "address", "internalType": "address" }
            ],
            "outputs": [],
            "stateMutability": "payable"
        }]),
        config.auction_address,
        Bytes::from(data),
        Some(value),
    )
}

/// Selector and arguments of a `createBidWithReferral` call.
pub fn decode_bid_calldata(data: &[u8]) -> Option<(U256, Address)> {
    if data.len() != 4 + 64 || data[..4] != IAuction::createBidWithReferralCall::SELECTOR {
        return None;
    }
    let token_id = U256::from_be_slice(&data[4..36]);
    let referral = Address::from_slice(&data[48..68]);
    Some((token_id, referral))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_calldata_is_selector_only() {
        let tx = settle_transaction(&FrameConfig::default());
        assert_eq!(tx.chain_id, "eip155:8453");
        assert_eq!(tx.params.to, FrameConfig::default().auction_address);
        assert_eq!(
            tx.params.data.as_ref(),
            IAuction::settleCurrentAndCreateNewAuctionCall::SELECTOR.as_slice()
        );
        assert!(tx.params.value.is_none());
    }

    #[test]
    fn test_bid_calldata_carries_token_and_referral() {
        let config = FrameConfig::default();
        let tx = bid_transaction(&config, U256::from(321u64), U256::from(5u64));

        assert_eq!(tx.params.value, Some(U256::from(5u64)));
        assert_eq!(
            decode_bid_calldata(&tx.params.data),
            Some((U256::from(321u64), config.referral))
        );
        assert_eq!(tx.params.abi[0]["name"], "createBidWithReferral");
    }

    #[test]
    fn test_decode_rejects_other_calls() {
        let tx = settle_transaction(&FrameConfig::default());
        assert!(decode_bid_calldata(&tx.params.data).is_none());
    }
}
