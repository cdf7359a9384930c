//! In-memory Ethereum node emulating the BuilderDAO auction contracts.
//!
//! Answers the calls the frame makes (`eth_call` against the auction house
//! and metadata renderer, `eth_getBalance`) from in-memory state, plus admin
//! methods to drive the auction without a real blockchain.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use tracing::info;

use auction_module::FrameConfig;
use auction_types::abi::{IAuction, IMetadataRenderer};
use auction_types::AuctionState;

pub mod types;
use types::*;

/// JSON-RPC error code geth uses for reverted calls.
const REVERT_CODE: i32 = 3;
const INVALID_PARAMS_CODE: i32 = -32602;

/// Reasons an `eth_call` cannot be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CallError {
    Revert(String),
    InvalidParams(String),
}

impl From<CallError> for ErrorObjectOwned {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Revert(msg) => {
                ErrorObjectOwned::owned(REVERT_CODE, format!("execution reverted: {}", msg), None::<()>)
            }
            CallError::InvalidParams(msg) => {
                ErrorObjectOwned::owned(INVALID_PARAMS_CODE, msg, None::<()>)
            }
        }
    }
}

/// Shared chain state.
pub struct ChainState {
    chain_id: u64,
    auction_address: Address,
    metadata_address: Address,
    auction: AuctionState,
    min_bid_increment: U256,
    reserve_price: U256,
    /// Explicit token URIs; others are generated
    token_uris: HashMap<U256, String>,
    balances: HashMap<Address, U256>,
    block_number: u64,
    duration: u64,
    image_base: String,
}

impl ChainState {
    pub fn new(
        config: &FrameConfig,
        duration: u64,
        min_bid_increment: u64,
        image_base: impl Into<String>,
    ) -> Self {
        let now = unix_now();
        Self {
            chain_id: config.chain_id,
            auction_address: config.auction_address,
            metadata_address: config.metadata_address,
            auction: AuctionState {
                token_id: U256::from(1u64),
                highest_bid: U256::ZERO,
                highest_bidder: Address::ZERO,
                start_time: now,
                end_time: now + duration,
                settled: false,
            },
            min_bid_increment: U256::from(min_bid_increment),
            reserve_price: config.reserve_price,
            token_uris: HashMap::new(),
            balances: HashMap::new(),
            block_number: 1,
            duration,
            image_base: image_base.into(),
        }
    }

    /// Answer an `eth_call` against one of the emulated contracts.
    fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, CallError> {
        if data.len() < 4 {
            return Err(CallError::Revert("missing selector".into()));
        }
        let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];

        if to == self.auction_address {
            self.call_auction(selector)
        } else if to == self.metadata_address {
            self.call_metadata(selector, &data[4..])
        } else {
            Err(CallError::Revert(format!("no contract at {}", to)))
        }
    }

    fn call_auction(&self, selector: [u8; 4]) -> Result<Vec<u8>, CallError> {
        if selector == IAuction::auctionCall::SELECTOR {
            let a = &self.auction;
            Ok((
                a.token_id,
                a.highest_bid,
                a.highest_bidder,
                U256::from(a.start_time),
                U256::from(a.end_time),
                a.settled,
            )
                .abi_encode_params())
        } else if selector == IAuction::minBidIncrementCall::SELECTOR {
            Ok(self.min_bid_increment.abi_encode())
        } else if selector == IAuction::reservePriceCall::SELECTOR {
            Ok(self.reserve_price.abi_encode())
        } else {
            Err(CallError::Revert(format!(
                "unknown auction selector 0x{}",
                hex::encode(selector)
            )))
        }
    }

    fn call_metadata(&self, selector: [u8; 4], args: &[u8]) -> Result<Vec<u8>, CallError> {
        if selector != IMetadataRenderer::tokenURICall::SELECTOR {
            return Err(CallError::Revert(format!(
                "unknown metadata selector 0x{}",
                hex::encode(selector)
            )));
        }
        if args.len() < 32 {
            return Err(CallError::Revert("missing tokenId".into()));
        }

        let token_id = U256::from_be_slice(&args[..32]);
        if token_id > self.auction.token_id {
            return Err(CallError::Revert(format!("token {} not minted", token_id)));
        }

        Ok((self.token_uri(token_id),).abi_encode_params())
    }

    fn token_uri(&self, token_id: U256) -> String {
        if let Some(uri) = self.token_uris.get(&token_id) {
            return uri.clone();
        }
        let document = serde_json::json!({
            "name": format!("Mfer Builder #{}", token_id),
            "description": "Mock token served by mock-chain",
            "image": format!("{}{}", self.image_base, token_id),
        });
        format!(
            "data:application/json;base64,{}",
            STANDARD.encode(document.to_string())
        )
    }

    fn balance(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    /// Settle the current auction and open the next one at `start_time`.
    fn settle_and_create(&mut self, start_time: u64) {
        self.auction = AuctionState {
            token_id: self.auction.token_id + U256::from(1u64),
            highest_bid: U256::ZERO,
            highest_bidder: Address::ZERO,
            start_time,
            end_time: start_time + self.duration,
            settled: false,
        };
        self.block_number += 1;
    }

    fn status(&self) -> StatusRpc {
        StatusRpc {
            chain_id: self.chain_id,
            block_number: self.block_number,
            auction_address: self.auction_address.to_string(),
            metadata_address: self.metadata_address.to_string(),
            token_id: self.auction.token_id.to_string(),
            highest_bid: self.auction.highest_bid.to_string(),
            end_time: self.auction.end_time,
            settled: self.auction.settled,
        }
    }
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Ethereum Methods ============

    #[method(name = "eth_chainId")]
    async fn eth_chain_id(&self) -> Result<String, ErrorObjectOwned>;

    #[method(name = "eth_blockNumber")]
    async fn eth_block_number(&self) -> Result<String, ErrorObjectOwned>;

    /// Execute a read-only call against the emulated contracts.
    #[method(name = "eth_call")]
    async fn eth_call(
        &self,
        tx: CallRequestRpc,
        block: Option<serde_json::Value>,
    ) -> Result<String, ErrorObjectOwned>;

    #[method(name = "eth_getBalance")]
    async fn eth_get_balance(
        &self,
        address: String,
        block: Option<serde_json::Value>,
    ) -> Result<String, ErrorObjectOwned>;

    // ============ Admin Methods ============

    /// Replace the running auction.
    #[method(name = "admin_setAuction")]
    async fn admin_set_auction(&self, auction: AuctionRpc) -> Result<bool, ErrorObjectOwned>;

    #[method(name = "admin_setMinBidIncrement")]
    async fn admin_set_min_bid_increment(&self, increment: u64) -> Result<bool, ErrorObjectOwned>;

    /// Pin the URI returned for a token.
    #[method(name = "admin_setTokenUri")]
    async fn admin_set_token_uri(
        &self,
        token_id: String,
        uri: String,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Set an account balance (decimal wei).
    #[method(name = "admin_setBalance")]
    async fn admin_set_balance(
        &self,
        address: String,
        balance: String,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Settle the running auction and start the next one now.
    #[method(name = "admin_settle")]
    async fn admin_settle(&self) -> Result<StatusRpc, ErrorObjectOwned>;

    #[method(name = "admin_status")]
    async fn admin_status(&self) -> Result<StatusRpc, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
pub struct MockChainServer {
    state: Arc<RwLock<ChainState>>,
}

impl MockChainServer {
    pub fn new(state: ChainState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn invalid(msg: &str) -> ErrorObjectOwned {
        CallError::InvalidParams(msg.to_string()).into()
    }
}

#[async_trait]
impl MockChainApiServer for MockChainServer {
    async fn eth_chain_id(&self) -> Result<String, ErrorObjectOwned> {
        Ok(quantity(U256::from(self.state.read().chain_id)))
    }

    async fn eth_block_number(&self) -> Result<String, ErrorObjectOwned> {
        Ok(quantity(U256::from(self.state.read().block_number)))
    }

    async fn eth_call(
        &self,
        tx: CallRequestRpc,
        _block: Option<serde_json::Value>,
    ) -> Result<String, ErrorObjectOwned> {
        let to = tx
            .to
            .as_deref()
            .and_then(parse_address)
            .ok_or_else(|| Self::invalid("Missing or invalid `to`"))?;
        let data = hex::decode(tx.calldata().unwrap_or("0x").trim_start_matches("0x"))
            .map_err(|e| Self::invalid(&format!("Invalid calldata: {}", e)))?;

        let output = self.state.read().call(to, &data)?;
        Ok(format!("0x{}", hex::encode(output)))
    }

    async fn eth_get_balance(
        &self,
        address: String,
        _block: Option<serde_json::Value>,
    ) -> Result<String, ErrorObjectOwned> {
        let address = parse_address(&address).ok_or_else(|| Self::invalid("Invalid address"))?;
        Ok(quantity(self.state.read().balance(&address)))
    }

    async fn admin_set_auction(&self, auction: AuctionRpc) -> Result<bool, ErrorObjectOwned> {
        let token_id = parse_wei(&auction.token_id).ok_or_else(|| Self::invalid("Invalid token_id"))?;
        let highest_bid =
            parse_wei(&auction.highest_bid).ok_or_else(|| Self::invalid("Invalid highest_bid"))?;
        let highest_bidder = match auction.highest_bidder.as_deref() {
            Some(s) => parse_address(s).ok_or_else(|| Self::invalid("Invalid highest_bidder"))?,
            None => Address::ZERO,
        };

        let mut state = self.state.write();
        state.auction = AuctionState {
            token_id,
            highest_bid,
            highest_bidder,
            start_time: auction.start_time,
            end_time: auction.end_time,
            settled: auction.settled,
        };
        state.block_number += 1;

        info!("Auction set to token {} (bid {})", token_id, highest_bid);
        Ok(true)
    }

    async fn admin_set_min_bid_increment(&self, increment: u64) -> Result<bool, ErrorObjectOwned> {
        self.state.write().min_bid_increment = U256::from(increment);
        info!("minBidIncrement set to {}", increment);
        Ok(true)
    }

    async fn admin_set_token_uri(
        &self,
        token_id: String,
        uri: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let token_id = parse_wei(&token_id).ok_or_else(|| Self::invalid("Invalid token_id"))?;
        self.state.write().token_uris.insert(token_id, uri);
        Ok(true)
    }

    async fn admin_set_balance(
        &self,
        address: String,
        balance: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let address = parse_address(&address).ok_or_else(|| Self::invalid("Invalid address"))?;
        let balance = parse_wei(&balance).ok_or_else(|| Self::invalid("Invalid balance"))?;
        self.state.write().balances.insert(address, balance);
        info!("Balance of {} set to {}", address, balance);
        Ok(true)
    }

    async fn admin_settle(&self) -> Result<StatusRpc, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.settle_and_create(unix_now());
        info!("Started auction for token {}", state.auction.token_id);
        Ok(state.status())
    }

    async fn admin_status(&self) -> Result<StatusRpc, ErrorObjectOwned> {
        Ok(self.state.read().status())
    }
}

/// Serve `state` on `listen` until the returned handle is stopped.
pub async fn serve(
    listen: SocketAddr,
    state: ChainState,
) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let server = Server::builder().build(listen).await?;
    let addr = server.local_addr()?;
    let handle = server.start(MockChainServer::new(state).into_rpc());
    Ok((addr, handle))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::TokenMetadata;

    fn state() -> ChainState {
        ChainState::new(&FrameConfig::default(), 3_600, 10, "https://img/")
    }

    #[test]
    fn test_auction_tuple_decodes_with_bindings() {
        let state = state();
        let output = state
            .call(state.auction_address, &IAuction::auctionCall {}.abi_encode())
            .unwrap();

        let (token_id, bid, bidder, start, end, settled) =
            <(U256, U256, Address, U256, U256, bool)>::abi_decode_params(&output).unwrap();

        assert_eq!(token_id, U256::from(1u64));
        assert_eq!(bid, U256::ZERO);
        assert_eq!(bidder, Address::ZERO);
        assert_eq!(end - start, U256::from(3_600u64));
        assert!(!settled);
    }

    #[test]
    fn test_min_bid_increment_word() {
        let state = state();
        let output = state
            .call(state.auction_address, &IAuction::minBidIncrementCall {}.abi_encode())
            .unwrap();
        assert_eq!(output.len(), 32);
        assert_eq!(U256::from_be_slice(&output), U256::from(10u64));
    }

    #[test]
    fn test_generated_token_uri_is_data_json() {
        let state = state();
        let calldata = IMetadataRenderer::tokenURICall {
            tokenId: U256::from(1u64),
        }
        .abi_encode();
        let output = state.call(state.metadata_address, &calldata).unwrap();

        let (uri,) = <(String,)>::abi_decode_params(&output).unwrap();
        let payload = uri.strip_prefix("data:application/json;base64,").unwrap();
        let metadata: TokenMetadata =
            serde_json::from_slice(&STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(metadata.image, "https://img/1");
    }

    #[test]
    fn test_unminted_token_reverts() {
        let state = state();
        let calldata = IMetadataRenderer::tokenURICall {
            tokenId: U256::from(2u64),
        }
        .abi_encode();
        assert!(matches!(
            state.call(state.metadata_address, &calldata),
            Err(CallError::Revert(_))
        ));
    }

    #[test]
    fn test_unknown_contract_and_selector_revert() {
        let state = state();
        assert!(matches!(
            state.call(Address::repeat_byte(1), &[0, 0, 0, 0]),
            Err(CallError::Revert(_))
        ));
        assert!(matches!(
            state.call(state.auction_address, &[1, 2, 3, 4]),
            Err(CallError::Revert(_))
        ));
        assert!(matches!(
            state.call(state.auction_address, &[1, 2]),
            Err(CallError::Revert(_))
        ));
    }

    #[test]
    fn test_settle_opens_next_auction() {
        let mut state = state();
        state.auction.highest_bid = U256::from(5u64);
        state.settle_and_create(10_000);

        assert_eq!(state.auction.token_id, U256::from(2u64));
        assert_eq!(state.auction.highest_bid, U256::ZERO);
        assert_eq!(state.auction.start_time, 10_000);
        assert_eq!(state.auction.end_time, 13_600);
    }

    #[test]
    fn test_balance_defaults_to_zero() {
        let mut state = state();
        let who = Address::repeat_byte(7);
        assert_eq!(state.balance(&who), U256::ZERO);
        state.balances.insert(who, U256::from(9u64));
        assert_eq!(quantity(state.balance(&who)), "0x9");
    }
}
