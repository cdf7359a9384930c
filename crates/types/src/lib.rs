//! Core type definitions for the BuilderDAO auction frame.
//!
//! This crate provides the shared data structures used across the frame,
//! including the on-chain auction snapshot, token metadata, the frame card
//! model and the unsigned transaction descriptors handed to wallets.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;
use tracing::warn;

pub mod abi;
pub mod units;

pub use units::{format_ether, parse_ether, UnitsError, WEI_PER_ETHER};

// =========================
// AUCTION STATE
// =========================

/// Snapshot of the auction house's `auction()` tuple.
///
/// Fetched fresh for every request and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuctionState {
    /// Token currently up for auction
    pub token_id: U256,
    /// Highest bid so far in wei (zero when nobody has bid)
    pub highest_bid: U256,
    /// Highest bidder (zero address when nobody has bid)
    pub highest_bidder: Address,
    /// Auction start (unix seconds)
    pub start_time: u64,
    /// Auction end (unix seconds)
    pub end_time: u64,
    /// Whether the auction has been settled
    pub settled: bool,
}

impl AuctionState {
    /// Whether the auction end time has passed at `now_millis`.
    pub fn has_ended(&self, now_millis: u64) -> bool {
        now_millis > self.end_time.saturating_mul(1000)
    }
}

impl From<abi::IAuction::auctionReturn> for AuctionState {
    fn from(ret: abi::IAuction::auctionReturn) -> Self {
        Self {
            token_id: ret.tokenId,
            highest_bid: ret.highestBid,
            highest_bidder: ret.highestBidder,
            start_time: ret.startTime.saturating_to::<u64>(),
            end_time: ret.endTime.saturating_to::<u64>(),
            settled: ret.settled,
        }
    }
}

/// Off-chain token metadata resolved from `tokenURI`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Artwork reference (http(s), ipfs or data URI)
    pub image: String,
}

// =========================
// FRAME CARDS
// =========================

/// Maximum number of buttons a frame may carry.
pub const MAX_BUTTONS: usize = 4;

/// Image shown on a frame card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardImage {
    /// Externally hosted image (token artwork)
    Url(String),
    /// Status message rendered by the server
    Text(String),
}

/// What a frame button does when pressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// POST the frame action to a route and render the returned card
    Post { target: String },
    /// Return to the initial frame
    Reset,
    /// Fetch a transaction descriptor from a route and hand it to the wallet
    Transaction { target: String },
    /// Open an external URL
    Link { href: String },
}

/// A single frame button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn post(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Post {
                target: target.into(),
            },
        }
    }

    pub fn reset(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Reset,
        }
    }

    pub fn transaction(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Transaction {
                target: target.into(),
            },
        }
    }

    pub fn link(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Link { href: href.into() },
        }
    }
}

/// A rendered frame: one image plus up to [`MAX_BUTTONS`] buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub image: CardImage,
    pub buttons: Vec<Button>,
}

impl Card {
    pub fn new(image: CardImage) -> Self {
        Self {
            image,
            buttons: Vec::new(),
        }
    }

    /// Append a button.
    ///
    /// Frame clients render at most [`MAX_BUTTONS`]; a button past the limit
    /// is a bug in the card's construction and is dropped with a warning.
    pub fn with_button(mut self, button: Button) -> Self {
        if self.buttons.len() < MAX_BUTTONS {
            self.buttons.push(button);
        } else {
            warn!(label = %button.label, "Dropping button past the frame limit");
        }
        self
    }

    /// Text shown on the card, if it is a status card.
    pub fn text(&self) -> Option<&str> {
        match &self.image {
            CardImage::Text(text) => Some(text),
            CardImage::Url(_) => None,
        }
    }
}

// =========================
// TRANSACTIONS
// =========================

/// Unsigned contract call returned to the frame client for wallet signing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// CAIP-2 chain id, e.g. `eip155:8453`
    pub chain_id: String,
    /// Always `eth_sendTransaction`
    pub method: String,
    pub params: TransactionParams,
}

/// Call parameters of a [`TransactionRequest`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionParams {
    /// JSON ABI fragment of the called function
    pub abi: serde_json::Value,
    #[serde(serialize_with = "serialize_display")]
    pub to: Address,
    #[serde(serialize_with = "serialize_display")]
    pub data: Bytes,
    /// Attached value in wei (omitted for non-payable calls)
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_display"
    )]
    pub value: Option<U256>,
}

impl TransactionRequest {
    pub const METHOD: &'static str = "eth_sendTransaction";

    pub fn new(
        chain_id: u64,
        abi: serde_json::Value,
        to: Address,
        data: Bytes,
        value: Option<U256>,
    ) -> Self {
        Self {
            chain_id: format!("eip155:{}", chain_id),
            method: Self::METHOD.to_string(),
            params: TransactionParams {
                abi,
                to,
                data,
                value,
            },
        }
    }
}

/// User-facing failure of a transaction route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionError {
    pub message: String,
}

impl TransactionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn serialize_opt_display<T: Display, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_ended_uses_milliseconds() {
        let auction = AuctionState {
            token_id: U256::from(7u64),
            highest_bid: U256::ZERO,
            highest_bidder: Address::ZERO,
            start_time: 1_000,
            end_time: 2_000,
            settled: false,
        };

        assert!(!auction.has_ended(1_999_999));
        assert!(!auction.has_ended(2_000_000));
        assert!(auction.has_ended(2_000_001));
    }

    #[test]
    fn test_card_caps_buttons() {
        let card = (0..6).fold(Card::new(CardImage::Text("hi".into())), |card, i| {
            card.with_button(Button::post(format!("b{}", i), "/x"))
        });
        assert_eq!(card.buttons.len(), MAX_BUTTONS);
        assert_eq!(card.buttons[MAX_BUTTONS - 1].label, "b3");
        assert_eq!(card.text(), Some("hi"));
    }

    #[test]
    fn test_transaction_request_wire_shape() {
        let tx = TransactionRequest::new(
            8453,
            serde_json::Value::Array(vec![]),
            Address::ZERO,
            Bytes::from(vec![0xde, 0xad]),
            Some(U256::from(25u64)),
        );
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["chainId"], "eip155:8453");
        assert_eq!(json["method"], "eth_sendTransaction");
        assert_eq!(json["params"]["data"], "0xdead");
        assert_eq!(json["params"]["value"], "25");
        assert_eq!(
            json["params"]["to"],
            "0x0000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_transaction_request_omits_zero_value() {
        let tx = TransactionRequest::new(
            8453,
            serde_json::Value::Null,
            Address::ZERO,
            Bytes::new(),
            None,
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json["params"].get("value").is_none());
    }

    #[test]
    fn test_metadata_ignores_unknown_fields() {
        let meta: TokenMetadata = serde_json::from_str(
            r#"{"name":"Mfer #1","image":"https://img/1.png","attributes":[]}"#,
        )
        .unwrap();
        assert_eq!(meta.image, "https://img/1.png");
        assert_eq!(meta.name.as_deref(), Some("Mfer #1"));
        assert!(meta.description.is_none());
    }
}
