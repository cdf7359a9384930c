//! RPC-compatible types for the mock chain.
//!
//! Amounts travel as decimal wei strings and addresses as hex strings, the
//! way a JSON client writes them by hand.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// `eth_call` transaction object. Fields the mock does not need are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallRequestRpc {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Calldata (current name)
    pub input: Option<String>,
    /// Calldata (legacy name)
    pub data: Option<String>,
}

impl CallRequestRpc {
    /// Calldata from whichever field the client filled in.
    pub fn calldata(&self) -> Option<&str> {
        self.input.as_deref().or(self.data.as_deref())
    }
}

/// Auction tuple for admin methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionRpc {
    /// Decimal token id
    pub token_id: String,
    /// Decimal wei
    pub highest_bid: String,
    /// Hex address, zero address when omitted
    pub highest_bidder: Option<String>,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default)]
    pub settled: bool,
}

/// Chain summary returned by `admin_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRpc {
    pub chain_id: u64,
    pub block_number: u64,
    pub auction_address: String,
    pub metadata_address: String,
    pub token_id: String,
    pub highest_bid: String,
    pub end_time: u64,
    pub settled: bool,
}

pub fn parse_address(s: &str) -> Option<Address> {
    s.parse().ok()
}

pub fn parse_wei(s: &str) -> Option<U256> {
    U256::from_str_radix(s.trim(), 10).ok()
}

/// `0x`-prefixed hex quantity as used by Ethereum JSON-RPC.
pub fn quantity(value: U256) -> String {
    format!("0x{:x}", value)
}
