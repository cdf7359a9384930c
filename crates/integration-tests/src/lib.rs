//! End-to-end tests for the auction frame.
//!
//! These tests drive the frame the way a Farcaster client does:
//! 1. Load the home card and press "join"
//! 2. Read the bid card and request the bid transaction
//! 3. Let the auction end and request the settle-and-create transaction
//!
//! The chain and the metadata host are in-memory; everything between them
//! and the HTTP response is the production code path.

#![cfg(test)]

mod rpc_flow;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, Bytes, U256};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use auction_module::{
    handlers::{BID_FAILED, INSUFFICIENT_BALANCE},
    transactions::decode_bid_calldata,
    FrameConfig, FrameController, StaticChainReader, StaticMetadata,
};
use auction_types::{parse_ether, AuctionState, TokenMetadata};
use frame_server::{router, AppState, FrameUrls, VerifyMode};

const ORIGIN: &str = "https://frame.example";
const TOKEN_ID: u64 = 317;
const META_URI: &str = "ipfs://bafymeta/317";
const IMAGE: &str = "https://img.example/317.svg";

fn bidder() -> Address {
    Address::repeat_byte(0xb0)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn auction(highest_bid: &str, end_time: u64) -> AuctionState {
    AuctionState {
        token_id: U256::from(TOKEN_ID),
        highest_bid: parse_ether(highest_bid).unwrap(),
        highest_bidder: Address::repeat_byte(0x11),
        start_time: end_time.saturating_sub(86_400),
        end_time,
        settled: false,
    }
}

fn running(highest_bid: &str) -> AuctionState {
    auction(highest_bid, now_secs() + 3_600)
}

fn ended(highest_bid: &str) -> AuctionState {
    auction(highest_bid, now_secs() - 3_600)
}

struct Frame {
    chain: Arc<StaticChainReader>,
    app: Router,
}

impl Frame {
    fn new(state: AuctionState, balance: &str) -> Self {
        Self::with_verify(state, balance, VerifyMode::Off)
    }

    fn with_verify(state: AuctionState, balance: &str, verify: VerifyMode) -> Self {
        let chain = Arc::new(
            StaticChainReader::new()
                .with_auction(state)
                .with_min_bid_increment(10)
                .with_token_uri(U256::from(TOKEN_ID), META_URI)
                .with_balance(bidder(), parse_ether(balance).unwrap()),
        );
        let metadata = StaticMetadata::new().with_document(
            META_URI,
            TokenMetadata {
                name: Some("BuilderDAO #317".into()),
                description: None,
                image: IMAGE.into(),
            },
        );
        let controller =
            FrameController::new(FrameConfig::default(), chain.clone(), Arc::new(metadata));

        let mut state = AppState::new(controller, FrameUrls::new(ORIGIN));
        state.verify = verify;

        Self {
            chain,
            app: router(state),
        }
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn press(&self, uri: &str, address: Option<Address>) -> (StatusCode, String) {
        let mut untrusted = serde_json::json!({
            "fid": 4_461,
            "url": format!("{}/api", ORIGIN),
            "messageHash": "0xd2b1ddc6c88e865a33cb1a565e0058d757042974",
            "timestamp": 1_706_243_218_000u64,
            "network": 1,
            "buttonIndex": 1,
            "castId": { "fid": 226, "hash": "0xa48dd46161d8e57725f5e26e34ec19c13ff7f3b9" }
        });
        if let Some(address) = address {
            untrusted["address"] = serde_json::Value::String(address.to_string());
        }
        let body = serde_json::json!({
            "untrustedData": untrusted,
            "trustedData": { "messageBytes": "0a4f08" }
        });

        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }
}

fn meta(property: &str, content: &str) -> String {
    format!(r#"<meta property="{}" content="{}" />"#, property, content)
}

/// Walk through a bid on a running auction and the restart once it ends.
#[tokio::test]
async fn test_full_frame_flow() {
    let frame = Frame::new(running("0.05"), "1");

    // ========================================
    // Home: token artwork and "join"
    // ========================================

    let (status, html) = frame.get("/api").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&meta("fc:frame", "vNext")));
    assert!(html.contains(&meta("fc:frame:image", IMAGE)));
    assert!(html.contains(&meta("fc:frame:button:1", "join BuilderDAO")));
    assert!(html.contains(&meta(
        "fc:frame:button:1:target",
        "https://frame.example/api/join"
    )));

    // ========================================
    // Join: current bid and minimum next bid
    // ========================================

    let (status, html) = frame.press("/api/join", Some(bidder())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/api/image?text=Current+bid%3A+0.05"));
    assert!(html.contains(&meta("fc:frame:button:1", "Bid 0.055")));
    assert!(html.contains(&meta("fc:frame:button:1:action", "tx")));
    assert!(html.contains(&meta(
        "fc:frame:button:1:target",
        "https://frame.example/api/mint"
    )));
    assert!(html.contains(&meta("fc:frame:button:3", "Share")));

    // ========================================
    // Mint: bid transaction for the minimum bid
    // ========================================

    let (status, body) = frame.press("/api/mint", Some(bidder())).await;
    assert_eq!(status, StatusCode::OK);
    let tx: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(tx["chainId"], "eip155:8453");
    assert_eq!(tx["method"], "eth_sendTransaction");
    assert_eq!(tx["params"]["value"], "55000000000000000");
    assert_eq!(
        tx["params"]["to"].as_str().unwrap().to_lowercase(),
        FrameConfig::default()
            .auction_address
            .to_string()
            .to_lowercase()
    );

    let data: Bytes = tx["params"]["data"].as_str().unwrap().parse().unwrap();
    let (token_id, referral) = decode_bid_calldata(&data).unwrap();
    assert_eq!(token_id, U256::from(TOKEN_ID));
    assert_eq!(referral, FrameConfig::default().referral);

    // ========================================
    // Auction ends: start the next one
    // ========================================

    frame.chain.set_auction(Some(ended("0.05")));

    let (_, html) = frame.press("/api/join", Some(bidder())).await;
    assert!(html.contains("There+are+no+active+auctions"));
    assert!(html.contains(&meta("fc:frame:button:1", "Start next auction")));
    assert!(html.contains(&meta(
        "fc:frame:button:1:target",
        "https://frame.example/api/startAuction"
    )));

    let (status, body) = frame.press("/api/startAuction", Some(bidder())).await;
    assert_eq!(status, StatusCode::OK);
    let tx: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(tx["params"]["abi"][0]["name"], "settleCurrentAndCreateNewAuction");
    assert!(tx["params"].get("value").is_none());
}

#[tokio::test]
async fn test_first_bid_uses_reserve_price() {
    let frame = Frame::new(running("0"), "1");

    let (_, html) = frame.get("/api/join").await;
    assert!(html.contains("Current+bid%3A+0"));
    assert!(html.contains(&meta("fc:frame:button:1", "Bid 0.025")));

    let (_, body) = frame.press("/api/mint", Some(bidder())).await;
    let tx: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(tx["params"]["value"], "25000000000000000");
}

#[tokio::test]
async fn test_bid_with_insufficient_balance() {
    let frame = Frame::new(running("0.05"), "0.054");

    let (status, body) = frame.press("/api/mint", Some(bidder())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["message"], INSUFFICIENT_BALANCE);
}

#[tokio::test]
async fn test_start_auction_with_insufficient_balance() {
    let frame = Frame::new(ended("0.05"), "0.01");

    let (status, body) = frame.press("/api/startAuction", Some(bidder())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains(INSUFFICIENT_BALANCE));
}

#[tokio::test]
async fn test_transaction_without_wallet_fails() {
    let frame = Frame::new(running("0.05"), "1");

    let (status, body) = frame.press("/api/mint", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains(BID_FAILED));
}

#[tokio::test]
async fn test_read_failure_shows_error_card() {
    let frame = Frame::new(running("0.05"), "1");
    frame.chain.set_min_bid_increment(None);

    let (status, html) = frame.press("/api/join", Some(bidder())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Error%2C+refresh+frame"));
    assert!(html.contains(&meta("fc:frame:button:1", "Reset")));
    assert!(html.contains(&meta("fc:frame:button:1:target", "https://frame.example/api")));

    // Nothing is cached: the next request sees the recovered chain
    frame.chain.set_min_bid_increment(Some(U256::from(10u64)));
    let (_, html) = frame.press("/api/join", Some(bidder())).await;
    assert!(html.contains(&meta("fc:frame:button:1", "Bid 0.055")));
}

#[tokio::test]
async fn test_strict_mode_without_hub_rejects_transactions() {
    let frame = Frame::with_verify(running("0.05"), "1", VerifyMode::Strict);

    let (status, body) = frame.press("/api/mint", Some(bidder())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains(frame_server::routes::INVALID_MESSAGE));

    // The artwork is still served
    let (status, html) = frame.press("/api", Some(bidder())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&meta("fc:frame:image", IMAGE)));
}

#[tokio::test]
async fn test_status_image() {
    let frame = Frame::new(running("0"), "0");

    let request = Request::get("/api/image?text=Current%20bid%3A%200.05")
        .body(Body::empty())
        .unwrap();
    let response = frame.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/svg+xml"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let svg = String::from_utf8(body.to_vec()).unwrap();
    assert!(svg.contains("Current bid: 0.05"));
}

#[tokio::test]
async fn test_health() {
    let frame = Frame::new(running("0"), "0");
    let (status, body) = frame.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_transaction_routes_only_accept_post() {
    let frame = Frame::new(running("0.05"), "1");

    let (status, _) = frame.get("/api/mint").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = frame.get("/api/startAuction").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = frame.get("/api/join").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_strict_mode_without_hub_shows_error_card_on_join() {
    let frame = Frame::with_verify(running("0.05"), "1", VerifyMode::Strict);

    let (status, html) = frame.press("/api/join", Some(bidder())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Error%2C+refresh+frame"));
}

#[tokio::test]
async fn test_ended_auction_without_increment_offers_start() {
    let frame = Frame::new(ended("0.05"), "1");
    frame.chain.set_min_bid_increment(None);

    let (_, html) = frame.press("/api/join", Some(bidder())).await;
    assert!(html.contains(&meta("fc:frame:button:1", "Start next auction")));
}
