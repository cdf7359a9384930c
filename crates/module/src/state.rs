//! Per-request view of the auction.
//!
//! Every handler builds its own snapshot from fresh reads. Nothing is
//! shared between requests.

use alloy::primitives::{Address, U256};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use auction_types::AuctionState;

use crate::config::FrameConfig;
use crate::error::FrameError;
use crate::pricing::minimum_bid;
use crate::queries::ChainReader;

/// Context provided by the HTTP layer for each request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Wall-clock time the request is served at (unix milliseconds)
    pub now_millis: u64,
    /// Connected wallet of the user, present on transaction requests
    pub caller: Option<Address>,
}

impl RequestContext {
    /// Context stamped with the current wall-clock time.
    pub fn now(caller: Option<Address>) -> Self {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self { now_millis, caller }
    }

    pub fn at(now_millis: u64) -> Self {
        Self {
            now_millis,
            caller: None,
        }
    }

    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn require_caller(&self) -> Result<Address, FrameError> {
        self.caller.ok_or(FrameError::MissingCaller)
    }
}

/// Auction plus everything needed to price the next bid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidSnapshot {
    pub auction: AuctionState,
    /// Raw `minBidIncrement()` value
    pub min_bid_increment: U256,
    /// Smallest acceptable next bid in wei
    pub minimum_bid: U256,
}

impl BidSnapshot {
    /// Read the auction and its increment, then price the next bid.
    pub async fn fetch(chain: &dyn ChainReader, config: &FrameConfig) -> Result<Self, FrameError> {
        let (auction, increment) = tokio::join!(chain.auction(), chain.min_bid_increment());
        let auction = auction.map_err(FrameError::AuctionRead)?;
        let min_bid_increment = increment.map_err(FrameError::IncrementRead)?;

        Self::price(auction, min_bid_increment, config)
    }

    /// Price the next bid on an auction that has already been read.
    pub async fn for_auction(
        chain: &dyn ChainReader,
        auction: AuctionState,
        config: &FrameConfig,
    ) -> Result<Self, FrameError> {
        let min_bid_increment = chain
            .min_bid_increment()
            .await
            .map_err(FrameError::IncrementRead)?;

        Self::price(auction, min_bid_increment, config)
    }

    fn price(
        auction: AuctionState,
        min_bid_increment: U256,
        config: &FrameConfig,
    ) -> Result<Self, FrameError> {
        let minimum_bid = minimum_bid(
            auction.highest_bid,
            min_bid_increment,
            config.reserve_price,
            config.increment_rule,
        )?;

        debug!(
            token_id = %auction.token_id,
            highest_bid = %auction.highest_bid,
            %min_bid_increment,
            %minimum_bid,
            "Priced next bid"
        );

        Ok(Self {
            auction,
            min_bid_increment,
            minimum_bid,
        })
    }
}

/// Read the auction tuple on its own.
pub async fn fetch_auction(chain: &dyn ChainReader) -> Result<AuctionState, FrameError> {
    chain.auction().await.map_err(FrameError::AuctionRead)
}

/// Read `address`'s balance and check it covers `required`.
pub async fn ensure_balance(
    chain: &dyn ChainReader,
    address: Address,
    required: U256,
) -> Result<U256, FrameError> {
    let available = chain
        .balance(address)
        .await
        .map_err(|source| FrameError::Balance { address, source })?;

    if available < required {
        return Err(FrameError::InsufficientBalance {
            required,
            available,
        });
    }
    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::StaticChainReader;
    use auction_types::parse_ether;

    fn auction(bid: U256) -> AuctionState {
        AuctionState {
            token_id: U256::from(42u64),
            highest_bid: bid,
            highest_bidder: Address::repeat_byte(0x11),
            start_time: 1_000,
            end_time: 2_000,
            settled: false,
        }
    }

    #[tokio::test]
    async fn test_snapshot_prices_next_bid() {
        let chain = StaticChainReader::new()
            .with_auction(auction(parse_ether("0.1").unwrap()))
            .with_min_bid_increment(10);

        let snapshot = BidSnapshot::fetch(&chain, &FrameConfig::default()).await.unwrap();
        assert_eq!(snapshot.minimum_bid, parse_ether("0.11").unwrap());
        assert_eq!(snapshot.min_bid_increment, U256::from(10u64));
    }

    #[tokio::test]
    async fn test_snapshot_reports_which_read_failed() {
        let chain = StaticChainReader::new().with_min_bid_increment(10);
        let err = BidSnapshot::fetch(&chain, &FrameConfig::default()).await.unwrap_err();
        assert!(matches!(err, FrameError::AuctionRead(_)));

        let chain = StaticChainReader::new().with_auction(auction(U256::ZERO));
        let err = BidSnapshot::fetch(&chain, &FrameConfig::default()).await.unwrap_err();
        assert!(matches!(err, FrameError::IncrementRead(_)));
    }

    #[tokio::test]
    async fn test_for_auction_reads_only_the_increment() {
        let chain = StaticChainReader::new().with_min_bid_increment(10);

        let snapshot = BidSnapshot::for_auction(
            &chain,
            auction(parse_ether("1").unwrap()),
            &FrameConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(snapshot.minimum_bid, parse_ether("1.1").unwrap());
        assert_eq!(snapshot.auction.token_id, U256::from(42u64));
    }

    #[tokio::test]
    async fn test_ensure_balance() {
        let who = Address::repeat_byte(0x22);
        let chain = StaticChainReader::new().with_balance(who, U256::from(100u64));

        assert!(ensure_balance(&chain, who, U256::from(100u64)).await.is_ok());
        assert!(matches!(
            ensure_balance(&chain, who, U256::from(101u64)).await,
            Err(FrameError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_require_caller() {
        assert!(matches!(
            RequestContext::at(0).require_caller(),
            Err(FrameError::MissingCaller)
        ));
        let who = Address::repeat_byte(0x33);
        assert_eq!(RequestContext::at(0).with_caller(who).require_caller().unwrap(), who);
    }
}
