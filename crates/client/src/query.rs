//! JSON-RPC chain reader.

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use tracing::debug;

use auction_module::{ChainReader, FrameConfig, ReadError};
use auction_types::abi::{IAuction, IMetadataRenderer};
use auction_types::AuctionState;

use crate::error::ClientError;

/// [`ChainReader`] backed by an Ethereum JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider,
    auction_address: Address,
    metadata_address: Address,
}

impl RpcChainReader {
    /// Connect to `rpc_url` and read the contracts named in `config`.
    pub async fn connect(rpc_url: &str, config: &FrameConfig) -> Result<Self, ClientError> {
        let provider = ProviderBuilder::new().connect(rpc_url).await?.erased();
        debug!("Connected to {}", rpc_url);
        Ok(Self::with_provider(provider, config))
    }

    pub fn with_provider(provider: DynProvider, config: &FrameConfig) -> Self {
        Self {
            provider,
            auction_address: config.auction_address,
            metadata_address: config.metadata_address,
        }
    }

    async fn read_auction(&self) -> Result<AuctionState, ClientError> {
        let auction = IAuction::new(self.auction_address, &self.provider);
        Ok(auction.auction().call().await?.into())
    }

    async fn read_min_bid_increment(&self) -> Result<U256, ClientError> {
        let auction = IAuction::new(self.auction_address, &self.provider);
        Ok(auction.minBidIncrement().call().await?)
    }

    async fn read_token_uri(&self, token_id: U256) -> Result<String, ClientError> {
        let renderer = IMetadataRenderer::new(self.metadata_address, &self.provider);
        Ok(renderer.tokenURI(token_id).call().await?)
    }

    async fn read_balance(&self, address: Address) -> Result<U256, ClientError> {
        Ok(self.provider.get_balance(address).await?)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn auction(&self) -> Result<AuctionState, ReadError> {
        Ok(self.read_auction().await?)
    }

    async fn min_bid_increment(&self) -> Result<U256, ReadError> {
        Ok(self.read_min_bid_increment().await?)
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, ReadError> {
        Ok(self.read_token_uri(token_id).await?)
    }

    async fn balance(&self, address: Address) -> Result<U256, ReadError> {
        Ok(self.read_balance(address).await?)
    }
}
