//! Mock chain server for local testing of the auction frame.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use auction_module::FrameConfig;
use mock_chain::ChainState;

#[derive(Parser)]
#[command(name = "mock-chain")]
#[command(about = "Local JSON-RPC node emulating the auction contracts")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8545")]
    listen: SocketAddr,

    /// Frame configuration file, for contract addresses and chain id
    #[arg(long)]
    config: Option<PathBuf>,

    /// Length of each auction in seconds
    #[arg(long, default_value = "86400")]
    duration: u64,

    /// minBidIncrement reported by the auction house
    #[arg(long, default_value = "10")]
    min_bid_increment: u64,

    /// Prefix for generated token artwork URLs
    #[arg(long, default_value = "https://picsum.photos/seed/mfer-")]
    image_base: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_chain=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::default(),
    };

    let state = ChainState::new(&config, cli.duration, cli.min_bid_increment, cli.image_base);

    info!("Starting mock chain server on {}", cli.listen);
    info!(
        "Auction house {} / metadata renderer {} on chain {}",
        config.auction_address, config.metadata_address, config.chain_id
    );

    let (addr, handle) = mock_chain::serve(cli.listen, state).await?;

    info!("Mock chain server running on {}. Press Ctrl+C to stop.", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}

