//! Frame server for the BuilderDAO auction.
//!
//! Reads the auction from a JSON-RPC endpoint for every request and serves
//! the frame under `/api`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use auction_client::{HttpMetadataFetcher, RpcChainReader};
use auction_module::{FrameConfig, FrameController};
use frame_server::{hub, router, AppState, FrameUrls, HubClient, VerifyMode};

#[derive(Parser)]
#[command(name = "frame-server")]
#[command(about = "Farcaster frame for the BuilderDAO auction")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: String,

    /// Ethereum JSON-RPC endpoint
    #[arg(long, default_value = "https://mainnet.base.org")]
    rpc_url: String,

    /// Public origin the frame is reachable at
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Frame configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Farcaster hub used to verify frame messages
    #[arg(long, default_value = hub::DEFAULT_HUB_URL)]
    hub_url: String,

    /// Hub API token
    #[arg(long, env = "AIRSTACK_API_TOKEN")]
    hub_token: Option<String>,

    /// How strictly frame messages are verified
    #[arg(long, value_enum, default_value_t = VerifyMode::Silent)]
    verify: VerifyMode,

    /// Gateway used for ipfs:// URIs
    #[arg(long, default_value = auction_client::metadata::DEFAULT_IPFS_GATEWAY)]
    ipfs_gateway: String,

    /// Timeout for metadata and hub requests, in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("frame_server=info".parse()?)
                .add_directive("auction_module=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::default(),
    };
    let timeout = Duration::from_secs(cli.timeout);

    let chain = RpcChainReader::connect(&cli.rpc_url, &config).await?;
    let metadata = HttpMetadataFetcher::new(cli.ipfs_gateway.clone(), timeout)?;

    info!("Auction house: {}", config.auction_address);
    info!("Chain id: {}", config.chain_id);
    info!("Increment rule: {:?}", config.increment_rule);

    let controller = FrameController::new(config, Arc::new(chain), Arc::new(metadata));
    let mut state = AppState::new(controller, FrameUrls::new(cli.base_url.clone()));
    if cli.verify != VerifyMode::Off {
        let hub = HubClient::new(cli.hub_url.clone(), cli.hub_token.clone(), timeout)?;
        info!("Verifying frame messages with {} ({:?})", cli.hub_url, cli.verify);
        state = state.with_hub(hub, cli.verify);
    }

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Frame server listening on {}", listener.local_addr()?);
    info!("Frame URL: {}/api", cli.base_url.trim_end_matches('/'));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    Ok(())
}
