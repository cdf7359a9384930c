//! The controller over real JSON-RPC, against the mock chain.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, U256};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::server::ServerHandle;

use auction_client::{HttpMetadataFetcher, RpcChainReader};
use auction_module::{
    cards::NO_AUCTION_TEXT, ChainReader, FrameConfig, FrameController, RequestContext,
};
use auction_types::{parse_ether, CardImage};
use mock_chain::ChainState;

const IMAGE_BASE: &str = "https://img.example/mfer-";

struct Node {
    url: String,
    admin: HttpClient,
    handle: ServerHandle,
}

impl Node {
    async fn start() -> Self {
        let state = ChainState::new(&FrameConfig::default(), 3_600, 10, IMAGE_BASE);
        let (addr, handle) = mock_chain::serve("127.0.0.1:0".parse().unwrap(), state)
            .await
            .unwrap();
        let url = format!("http://{}", addr);
        let admin = HttpClientBuilder::default().build(&url).unwrap();
        Self { url, admin, handle }
    }

    async fn set_auction(&self, token_id: u64, highest_bid: &str, end_time: u64) {
        let auction = serde_json::json!({
            "token_id": token_id.to_string(),
            "highest_bid": parse_ether(highest_bid).unwrap().to_string(),
            "highest_bidder": Address::repeat_byte(0x11).to_string(),
            "start_time": end_time.saturating_sub(86_400),
            "end_time": end_time,
        });
        let ok: bool = self
            .admin
            .request("admin_setAuction", vec![auction])
            .await
            .unwrap();
        assert!(ok);
    }

    async fn set_balance(&self, address: Address, ether: &str) {
        let ok: bool = self
            .admin
            .request(
                "admin_setBalance",
                vec![address.to_string(), parse_ether(ether).unwrap().to_string()],
            )
            .await
            .unwrap();
        assert!(ok);
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Walk the frame through a bid, the end of the auction and the settlement.
#[tokio::test]
async fn test_frame_over_rpc() {
    let node = Node::start().await;
    let config = FrameConfig::default();
    let bidder = Address::repeat_byte(0xb0);

    let chain = Arc::new(RpcChainReader::connect(&node.url, &config).await.unwrap());
    let controller = FrameController::new(
        config.clone(),
        chain.clone(),
        Arc::new(HttpMetadataFetcher::default()),
    );

    // ========================================
    // Raw reads decode through the bindings
    // ========================================

    let auction = chain.auction().await.unwrap();
    assert_eq!(auction.token_id, U256::from(1u64));
    assert_eq!(auction.highest_bid, U256::ZERO);
    assert_eq!(auction.end_time - auction.start_time, 3_600);
    assert!(!auction.settled);

    assert_eq!(chain.min_bid_increment().await.unwrap(), U256::from(10u64));
    assert!(chain
        .token_uri(U256::from(1u64))
        .await
        .unwrap()
        .starts_with("data:application/json;base64,"));
    assert!(chain.token_uri(U256::from(2u64)).await.is_err());
    assert_eq!(chain.balance(bidder).await.unwrap(), U256::ZERO);

    // ========================================
    // Home resolves the inline metadata
    // ========================================

    let card = controller.render_home(&RequestContext::now(None)).await;
    assert_eq!(card.image, CardImage::Url(format!("{}1", IMAGE_BASE)));

    // ========================================
    // Running auction with a bid
    // ========================================

    node.set_auction(1, "0.05", now_secs() + 3_600).await;
    node.set_balance(bidder, "1").await;
    assert_eq!(chain.balance(bidder).await.unwrap(), parse_ether("1").unwrap());

    let ctx = RequestContext::now(Some(bidder));
    let card = controller.render_join_or_bid(&ctx).await;
    assert_eq!(card.text(), Some("Current bid: 0.05"));
    assert_eq!(card.buttons[0].label, "Bid 0.055");

    let tx = controller.build_bid_transaction(&ctx).await.unwrap();
    assert_eq!(tx.params.value, Some(parse_ether("0.055").unwrap()));
    assert_eq!(tx.params.to, config.auction_address);

    // ========================================
    // Auction ends, then gets settled
    // ========================================

    node.set_auction(1, "0.05", now_secs() - 60).await;
    let card = controller.render_join_or_bid(&ctx).await;
    assert_eq!(card.text(), Some(NO_AUCTION_TEXT));
    assert!(controller.build_start_auction_transaction(&ctx).await.is_ok());

    let status: serde_json::Value = node
        .admin
        .request("admin_settle", Vec::<()>::new())
        .await
        .unwrap();
    assert_eq!(status["token_id"], "2");

    let auction = chain.auction().await.unwrap();
    assert_eq!(auction.token_id, U256::from(2u64));
    assert_eq!(auction.highest_bid, U256::ZERO);

    let card = controller.render_join_or_bid(&ctx).await;
    assert_eq!(card.text(), Some("Current bid: 0"));
    assert_eq!(card.buttons[0].label, "Bid 0.025");

    let card = controller.render_home(&ctx).await;
    assert_eq!(card.image, CardImage::Url(format!("{}2", IMAGE_BASE)));

    node.handle.stop().unwrap();
}

#[tokio::test]
async fn test_unreachable_node_shows_error_card() {
    let node = Node::start().await;
    let chain = RpcChainReader::connect(&node.url, &FrameConfig::default())
        .await
        .unwrap();
    node.handle.stop().unwrap();
    node.handle.clone().stopped().await;

    let controller = FrameController::new(
        FrameConfig::default(),
        Arc::new(chain),
        Arc::new(HttpMetadataFetcher::default()),
    );
    let card = controller
        .render_join_or_bid(&RequestContext::now(None))
        .await;
    assert_eq!(card.text(), Some(auction_module::cards::ERROR_TEXT));
}
