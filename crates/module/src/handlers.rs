//! Request handlers for the auction frame.
//!
//! Each handler reads what it needs into a per-request snapshot, logs any
//! failed read and maps it onto the fixed card or message the frame shows.

use std::sync::Arc;

use tracing::{info, warn};

use auction_types::{Card, TransactionError, TransactionRequest};

use crate::call::FrameRoute;
use crate::cards;
use crate::config::FrameConfig;
use crate::error::FrameError;
use crate::queries::{ChainReader, MetadataFetcher};
use crate::state::{ensure_balance, fetch_auction, BidSnapshot, RequestContext};
use crate::transactions::{bid_transaction, settle_transaction};

pub const INSUFFICIENT_BALANCE: &str = "Insufficient balance";
pub const TRANSACTION_FAILED: &str = "Transaction failed";
pub const BID_FAILED: &str = "Could not create bid";

/// Result type for transaction handlers.
pub type HandlerResult<T> = Result<T, FrameError>;

/// What a frame route answers with.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameResponse {
    Card(Card),
    Transaction(TransactionRequest),
    Error(TransactionError),
}

/// Auction view controller.
#[derive(Clone)]
pub struct FrameController {
    config: Arc<FrameConfig>,
    chain: Arc<dyn ChainReader>,
    metadata: Arc<dyn MetadataFetcher>,
}

impl FrameController {
    pub fn new(
        config: FrameConfig,
        chain: Arc<dyn ChainReader>,
        metadata: Arc<dyn MetadataFetcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chain,
            metadata,
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Dispatch a request to the handler behind `route`.
    pub async fn handle(&self, route: FrameRoute, ctx: &RequestContext) -> FrameResponse {
        match route {
            FrameRoute::Home => FrameResponse::Card(self.render_home(ctx).await),
            FrameRoute::Join => FrameResponse::Card(self.render_join_or_bid(ctx).await),
            FrameRoute::StartAuction => match self.build_start_auction_transaction(ctx).await {
                Ok(tx) => FrameResponse::Transaction(tx),
                Err(e) => FrameResponse::Error(e),
            },
            FrameRoute::Mint => match self.build_bid_transaction(ctx).await {
                Ok(tx) => FrameResponse::Transaction(tx),
                Err(e) => FrameResponse::Error(e),
            },
        }
    }

    /// Initial view: the artwork of the token being auctioned.
    pub async fn render_home(&self, _ctx: &RequestContext) -> Card {
        match self.token_image().await {
            Ok(image) => cards::artwork_card(image),
            Err(e) => {
                warn!("Home view failed: {}", e);
                cards::error_card()
            }
        }
    }

    /// Bid view while the auction runs, "start next auction" after it ends.
    pub async fn render_join_or_bid(&self, ctx: &RequestContext) -> Card {
        let auction = match fetch_auction(self.chain.as_ref()).await {
            Ok(auction) => auction,
            Err(e) => {
                warn!("Auction view failed: {}", e);
                return cards::error_card();
            }
        };

        // Pricing only matters while bids are accepted
        if auction.has_ended(ctx.now_millis) {
            return cards::no_auction_card(&self.config);
        }

        match BidSnapshot::for_auction(self.chain.as_ref(), auction, &self.config).await {
            Ok(snapshot) => cards::bid_card(
                &self.config,
                snapshot.auction.highest_bid,
                snapshot.minimum_bid,
            ),
            Err(e) => {
                warn!("Auction view failed: {}", e);
                cards::error_card()
            }
        }
    }

    /// Settle the finished auction and open the next one.
    pub async fn build_start_auction_transaction(
        &self,
        ctx: &RequestContext,
    ) -> Result<TransactionRequest, TransactionError> {
        self.start_auction(ctx)
            .await
            .map_err(|e| user_error(e, TRANSACTION_FAILED))
    }

    /// Bid the minimum acceptable amount on the running auction.
    pub async fn build_bid_transaction(
        &self,
        ctx: &RequestContext,
    ) -> Result<TransactionRequest, TransactionError> {
        self.bid(ctx).await.map_err(|e| user_error(e, BID_FAILED))
    }

    async fn token_image(&self) -> HandlerResult<String> {
        let auction = fetch_auction(self.chain.as_ref()).await?;
        let token_id = auction.token_id;

        let uri = self
            .chain
            .token_uri(token_id)
            .await
            .map_err(|source| FrameError::TokenUri { token_id, source })?;

        let metadata = self
            .metadata
            .fetch(&uri)
            .await
            .map_err(|source| FrameError::Metadata { uri, source })?;

        Ok(metadata.image)
    }

    async fn start_auction(&self, ctx: &RequestContext) -> HandlerResult<TransactionRequest> {
        let caller = ctx.require_caller()?;
        let auction = fetch_auction(self.chain.as_ref()).await?;

        ensure_balance(self.chain.as_ref(), caller, self.config.reserve_price).await?;

        info!(
            %caller,
            token_id = %auction.token_id,
            "Built settle-and-create transaction"
        );
        Ok(settle_transaction(&self.config))
    }

    async fn bid(&self, ctx: &RequestContext) -> HandlerResult<TransactionRequest> {
        let caller = ctx.require_caller()?;
        let snapshot = BidSnapshot::fetch(self.chain.as_ref(), &self.config).await?;

        ensure_balance(self.chain.as_ref(), caller, snapshot.minimum_bid).await?;

        info!(
            %caller,
            token_id = %snapshot.auction.token_id,
            value = %snapshot.minimum_bid,
            "Built bid transaction"
        );
        Ok(bid_transaction(
            &self.config,
            snapshot.auction.token_id,
            snapshot.minimum_bid,
        ))
    }
}

/// Log a transaction failure and reduce it to the message the user sees.
fn user_error(error: FrameError, fallback: &str) -> TransactionError {
    match error {
        FrameError::InsufficientBalance { .. } => {
            info!("Rejected transaction: {}", error);
            TransactionError::new(INSUFFICIENT_BALANCE)
        }
        other => {
            warn!("Transaction failed: {}", other);
            TransactionError::new(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{StaticChainReader, StaticMetadata};
    use alloy::primitives::{Address, U256};
    use auction_types::{parse_ether, AuctionState, ButtonAction, CardImage, TokenMetadata};

    const END_TIME: u64 = 1_700_000_000;
    const META_URI: &str = "https://meta.example/42";
    const IMAGE: &str = "https://img.example/42.png";

    fn caller() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn auction(bid: &str) -> AuctionState {
        AuctionState {
            token_id: U256::from(42u64),
            highest_bid: parse_ether(bid).unwrap(),
            highest_bidder: Address::repeat_byte(0x11),
            start_time: END_TIME - 86_400,
            end_time: END_TIME,
            settled: false,
        }
    }

    fn before_end() -> RequestContext {
        RequestContext::at(END_TIME * 1000 - 1).with_caller(caller())
    }

    fn after_end() -> RequestContext {
        RequestContext::at(END_TIME * 1000 + 1).with_caller(caller())
    }

    fn controller(chain: StaticChainReader) -> FrameController {
        let metadata = StaticMetadata::new().with_document(
            META_URI,
            TokenMetadata {
                image: IMAGE.to_string(),
                ..Default::default()
            },
        );
        FrameController::new(FrameConfig::default(), Arc::new(chain), Arc::new(metadata))
    }

    fn chain(bid: &str, balance: &str) -> StaticChainReader {
        StaticChainReader::new()
            .with_auction(auction(bid))
            .with_min_bid_increment(10)
            .with_token_uri(U256::from(42u64), META_URI)
            .with_balance(caller(), parse_ether(balance).unwrap())
    }

    #[tokio::test]
    async fn test_home_shows_artwork() {
        let card = controller(chain("0", "0")).render_home(&before_end()).await;

        assert_eq!(card.image, CardImage::Url(IMAGE.to_string()));
        assert_eq!(card.buttons.len(), 1);
        assert_eq!(
            card.buttons[0].action,
            ButtonAction::Post {
                target: "/join".into()
            }
        );
    }

    #[tokio::test]
    async fn test_home_metadata_failure_shows_error_card() {
        let chain = chain("0", "0").with_token_uri(U256::from(42u64), "https://meta.example/missing");
        let card = controller(chain).render_home(&before_end()).await;

        assert_eq!(card, cards::error_card());
        assert_eq!(card.buttons.len(), 1);
        assert_eq!(card.buttons[0].action, ButtonAction::Reset);
    }

    #[tokio::test]
    async fn test_home_auction_failure_shows_error_card() {
        let chain = chain("0", "0");
        chain.set_auction(None);
        let card = controller(chain).render_home(&before_end()).await;
        assert_eq!(card, cards::error_card());
    }

    #[tokio::test]
    async fn test_join_active_auction_shows_bid() {
        let card = controller(chain("0.05", "0")).render_join_or_bid(&before_end()).await;

        assert_eq!(card.text(), Some("Current bid: 0.05"));
        assert_eq!(card.buttons[0].label, "Bid 0.055");
        assert_eq!(
            card.buttons[0].action,
            ButtonAction::Transaction {
                target: "/mint".into()
            }
        );
        assert_eq!(card.buttons.len(), 3);
    }

    #[tokio::test]
    async fn test_join_without_bids_offers_reserve() {
        let card = controller(chain("0", "0")).render_join_or_bid(&before_end()).await;

        assert_eq!(card.text(), Some("Current bid: 0"));
        assert_eq!(card.buttons[0].label, "Bid 0.025");
    }

    #[tokio::test]
    async fn test_join_ended_auction_offers_start() {
        let card = controller(chain("0.05", "0")).render_join_or_bid(&after_end()).await;

        assert_eq!(card.text(), Some(cards::NO_AUCTION_TEXT));
        assert_eq!(
            card.buttons[0].action,
            ButtonAction::Transaction {
                target: "/startAuction".into()
            }
        );
        assert!(matches!(card.buttons[1].action, ButtonAction::Link { .. }));
        assert!(matches!(card.buttons[2].action, ButtonAction::Link { .. }));
    }

    #[tokio::test]
    async fn test_join_ended_auction_ignores_pricing_failures() {
        let unset = chain("0.05", "0");
        unset.set_min_bid_increment(None);

        let zero_increment = chain("0.000000000000000005", "0");
        zero_increment.set_min_bid_increment(Some(U256::ZERO));

        let overflowing = chain("0", "0");
        overflowing.set_auction(Some(AuctionState {
            highest_bid: U256::MAX,
            ..auction("0")
        }));

        for chain in [unset, zero_increment, overflowing] {
            let card = controller(chain).render_join_or_bid(&after_end()).await;
            assert_eq!(card.text(), Some(cards::NO_AUCTION_TEXT));
        }
    }

    #[tokio::test]
    async fn test_join_read_failure_shows_error_card() {
        let chain = chain("0.05", "0");
        chain.set_min_bid_increment(None);
        let card = controller(chain).render_join_or_bid(&before_end()).await;
        assert_eq!(card, cards::error_card());
    }

    #[tokio::test]
    async fn test_start_auction_requires_reserve_balance() {
        let err = controller(chain("0", "0.0249"))
            .build_start_auction_transaction(&after_end())
            .await
            .unwrap_err();
        assert_eq!(err.message, INSUFFICIENT_BALANCE);

        let tx = controller(chain("0", "0.025"))
            .build_start_auction_transaction(&after_end())
            .await
            .unwrap();
        assert_eq!(tx.params.abi[0]["name"], "settleCurrentAndCreateNewAuction");
        assert!(tx.params.value.is_none());
    }

    #[tokio::test]
    async fn test_start_auction_read_failure() {
        let chain = chain("0", "1");
        chain.fail_balances(true);
        let err = controller(chain)
            .build_start_auction_transaction(&after_end())
            .await
            .unwrap_err();
        assert_eq!(err.message, TRANSACTION_FAILED);
    }

    #[tokio::test]
    async fn test_start_auction_without_caller() {
        let err = controller(chain("0", "1"))
            .build_start_auction_transaction(&RequestContext::at(0))
            .await
            .unwrap_err();
        assert_eq!(err.message, TRANSACTION_FAILED);
    }

    #[tokio::test]
    async fn test_bid_value_is_minimum_bid() {
        let tx = controller(chain("0.05", "0.055"))
            .build_bid_transaction(&before_end())
            .await
            .unwrap();
        assert_eq!(tx.params.value, Some(parse_ether("0.055").unwrap()));
        assert_eq!(tx.params.to, FrameConfig::default().auction_address);
    }

    #[tokio::test]
    async fn test_bid_insufficient_balance() {
        let err = controller(chain("0.05", "0.054999"))
            .build_bid_transaction(&before_end())
            .await
            .unwrap_err();
        assert_eq!(err.message, INSUFFICIENT_BALANCE);
    }

    #[tokio::test]
    async fn test_bid_zero_increment_fails() {
        let chain = chain("0.05", "10");
        chain.set_min_bid_increment(Some(U256::ZERO));
        let err = controller(chain)
            .build_bid_transaction(&before_end())
            .await
            .unwrap_err();
        assert_eq!(err.message, BID_FAILED);
    }

    #[tokio::test]
    async fn test_handle_dispatches_by_route() {
        let controller = controller(chain("0.05", "1"));

        assert!(matches!(
            controller.handle(FrameRoute::Home, &before_end()).await,
            FrameResponse::Card(_)
        ));
        assert!(matches!(
            controller.handle(FrameRoute::Mint, &before_end()).await,
            FrameResponse::Transaction(_)
        ));
        assert!(matches!(
            controller
                .handle(FrameRoute::StartAuction, &RequestContext::at(0))
                .await,
            FrameResponse::Error(_)
        ));
    }
}
