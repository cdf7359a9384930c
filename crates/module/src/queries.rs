//! Read seams used by the controller.
//!
//! The controller never talks to a node or an HTTP server directly. It goes
//! through these traits so each request can be served from any backend.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use auction_types::{AuctionState, TokenMetadata};

use crate::error::ReadError;

/// Read-only access to the auction house, metadata renderer and balances.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Current `auction()` tuple.
    async fn auction(&self) -> Result<AuctionState, ReadError>;

    /// Raw `minBidIncrement()` value.
    async fn min_bid_increment(&self) -> Result<U256, ReadError>;

    /// `tokenURI(tokenId)` from the metadata renderer.
    async fn token_uri(&self, token_id: U256) -> Result<String, ReadError>;

    /// Native balance of `address` in wei.
    async fn balance(&self, address: Address) -> Result<U256, ReadError>;
}

/// Resolves a token URI into its metadata document.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata, ReadError>;
}

/// In-memory chain for tests and local runs.
///
/// Unset values behave like failed reads. Unknown accounts have a zero
/// balance, like on a real node.
#[derive(Debug, Default)]
pub struct StaticChainReader {
    inner: RwLock<StaticChain>,
}

#[derive(Debug, Default)]
struct StaticChain {
    auction: Option<AuctionState>,
    min_bid_increment: Option<U256>,
    token_uris: HashMap<U256, String>,
    balances: HashMap<Address, U256>,
    fail_balances: bool,
}

impl StaticChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auction(self, auction: AuctionState) -> Self {
        self.set_auction(Some(auction));
        self
    }

    pub fn with_min_bid_increment(self, increment: u64) -> Self {
        self.set_min_bid_increment(Some(U256::from(increment)));
        self
    }

    pub fn with_token_uri(self, token_id: U256, uri: impl Into<String>) -> Self {
        self.inner.write().token_uris.insert(token_id, uri.into());
        self
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.set_balance(address, balance);
        self
    }

    pub fn set_auction(&self, auction: Option<AuctionState>) {
        self.inner.write().auction = auction;
    }

    pub fn set_min_bid_increment(&self, increment: Option<U256>) {
        self.inner.write().min_bid_increment = increment;
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.inner.write().balances.insert(address, balance);
    }

    /// Make every balance read fail.
    pub fn fail_balances(&self, fail: bool) {
        self.inner.write().fail_balances = fail;
    }
}

#[async_trait]
impl ChainReader for StaticChainReader {
    async fn auction(&self) -> Result<AuctionState, ReadError> {
        self.inner
            .read()
            .auction
            .clone()
            .ok_or_else(|| "auction not available".into())
    }

    async fn min_bid_increment(&self) -> Result<U256, ReadError> {
        self.inner
            .read()
            .min_bid_increment
            .ok_or_else(|| "minBidIncrement not available".into())
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, ReadError> {
        self.inner
            .read()
            .token_uris
            .get(&token_id)
            .cloned()
            .ok_or_else(|| format!("execution reverted: no token {}", token_id).into())
    }

    async fn balance(&self, address: Address) -> Result<U256, ReadError> {
        let chain = self.inner.read();
        if chain.fail_balances {
            return Err("balance not available".into());
        }
        Ok(chain.balances.get(&address).copied().unwrap_or_default())
    }
}

/// In-memory metadata documents keyed by URI.
#[derive(Debug, Default)]
pub struct StaticMetadata {
    documents: RwLock<HashMap<String, TokenMetadata>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, uri: impl Into<String>, metadata: TokenMetadata) -> Self {
        self.documents.write().insert(uri.into(), metadata);
        self
    }
}

#[async_trait]
impl MetadataFetcher for StaticMetadata {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata, ReadError> {
        self.documents
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| format!("404 Not Found: {}", uri).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unset_values_fail() {
        let chain = StaticChainReader::new();
        assert!(chain.auction().await.is_err());
        assert!(chain.min_bid_increment().await.is_err());
        assert!(chain.token_uri(U256::from(1u64)).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_account_has_zero_balance() {
        let chain = StaticChainReader::new();
        assert_eq!(chain.balance(Address::ZERO).await.unwrap(), U256::ZERO);

        chain.fail_balances(true);
        assert!(chain.balance(Address::ZERO).await.is_err());
    }

    #[tokio::test]
    async fn test_static_metadata_lookup() {
        let meta = StaticMetadata::new().with_document(
            "https://meta/1",
            TokenMetadata {
                image: "https://img/1.png".into(),
                ..Default::default()
            },
        );
        assert_eq!(meta.fetch("https://meta/1").await.unwrap().image, "https://img/1.png");
        assert!(meta.fetch("https://meta/2").await.is_err());
    }
}
