//! CLI for inspecting the auction the frame serves.
//!
//! This binary provides commands for:
//! - Reading the current auction and its minimum next bid
//! - Resolving token metadata
//! - Rendering the frame views as text
//! - Building the transactions the frame would hand to a wallet

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use auction_client::{HttpMetadataFetcher, RpcChainReader};
use auction_module::{
    BidSnapshot, ChainReader, FrameConfig, FrameController, MetadataFetcher, RequestContext,
};
use auction_types::{format_ether, ButtonAction, Card, CardImage};

#[derive(Parser)]
#[command(name = "auction-cli")]
#[command(about = "Inspect the BuilderDAO auction behind the frame")]
struct Cli {
    /// Ethereum JSON-RPC endpoint
    #[arg(long, default_value = "https://mainnet.base.org")]
    rpc: String,

    /// Frame configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gateway used for ipfs:// URIs
    #[arg(long, default_value = auction_client::metadata::DEFAULT_IPFS_GATEWAY)]
    ipfs_gateway: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the running auction and the minimum next bid
    Auction,

    /// Resolve the metadata of a token (defaults to the one on auction)
    Metadata {
        #[arg(long)]
        token_id: Option<U256>,
    },

    /// Render a frame view as text
    View {
        /// Render the home view instead of the auction view
        #[arg(long)]
        home: bool,
    },

    /// Build the settle-and-create transaction for a caller
    StartTx {
        /// Caller address (hex)
        #[arg(long)]
        caller: Address,
    },

    /// Build the minimum bid transaction for a caller
    BidTx {
        /// Caller address (hex)
        #[arg(long)]
        caller: Address,
    },

    /// Show the native balance of an account
    Balance {
        /// Account address (hex)
        #[arg(long)]
        address: Address,
    },
}

async fn auction_cmd(chain: &RpcChainReader, config: &FrameConfig) -> Result<()> {
    let snapshot = BidSnapshot::fetch(chain, config).await?;
    let ctx = RequestContext::now(None);
    let a = &snapshot.auction;

    println!("Auction for token {}:", a.token_id);
    println!("  Highest bid: {} ETH", format_ether(a.highest_bid));
    println!("  Highest bidder: {}", a.highest_bidder);
    println!("  Start: {}", a.start_time);
    println!("  End: {}", a.end_time);
    println!("  Settled: {}", a.settled);
    println!("  Ended: {}", a.has_ended(ctx.now_millis));
    println!("  Min bid increment: {}", snapshot.min_bid_increment);
    println!("  Minimum next bid: {} ETH", format_ether(snapshot.minimum_bid));

    Ok(())
}

async fn metadata_cmd(
    chain: &RpcChainReader,
    fetcher: &HttpMetadataFetcher,
    token_id: Option<U256>,
) -> Result<()> {
    let token_id = match token_id {
        Some(id) => id,
        None => chain.auction().await.map_err(|e| anyhow!(e))?.token_id,
    };

    let uri = chain.token_uri(token_id).await.map_err(|e| anyhow!(e))?;
    let metadata = fetcher.fetch(&uri).await.map_err(|e| anyhow!(e))?;

    println!("Token {}:", token_id);
    if let Some(name) = &metadata.name {
        println!("  Name: {}", name);
    }
    println!("  Image: {}", metadata.image);

    Ok(())
}

async fn balance_cmd(chain: &RpcChainReader, address: Address) -> Result<()> {
    let balance = chain.balance(address).await.map_err(|e| anyhow!(e))?;
    println!("{} ETH", format_ether(balance));
    Ok(())
}

fn print_card(card: &Card) {
    match &card.image {
        CardImage::Url(url) => println!("[image] {}", url),
        CardImage::Text(text) => println!("[text] {}", text),
    }
    for (i, button) in card.buttons.iter().enumerate() {
        let action = match &button.action {
            ButtonAction::Post { target } => format!("post {}", target),
            ButtonAction::Reset => "reset".to_string(),
            ButtonAction::Transaction { target } => format!("tx {}", target),
            ButtonAction::Link { href } => format!("link {}", href),
        };
        println!("  ({}) {} -> {}", i + 1, button.label, action);
    }
}

fn print_transaction(
    result: Result<auction_types::TransactionRequest, auction_types::TransactionError>,
) -> Result<()> {
    match result {
        Ok(tx) => println!("{}", serde_json::to_string_pretty(&tx)?),
        Err(e) => println!("Error: {}", e.message),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auction_cli=info".parse()?)
                .add_directive("auction_module=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FrameConfig::load(path)?,
        None => FrameConfig::default(),
    };

    let chain = RpcChainReader::connect(&cli.rpc, &config).await?;
    let fetcher = HttpMetadataFetcher::new(
        cli.ipfs_gateway.clone(),
        auction_client::metadata::DEFAULT_TIMEOUT,
    )?;
    info!("Using auction house {}", config.auction_address);

    match cli.command {
        Commands::Auction => {
            auction_cmd(&chain, &config).await?;
        }

        Commands::Metadata { token_id } => {
            metadata_cmd(&chain, &fetcher, token_id).await?;
        }

        Commands::Balance { address } => {
            balance_cmd(&chain, address).await?;
        }

        Commands::View { home } => {
            let controller = FrameController::new(config, Arc::new(chain), Arc::new(fetcher));
            let ctx = RequestContext::now(None);
            let card = if home {
                controller.render_home(&ctx).await
            } else {
                controller.render_join_or_bid(&ctx).await
            };
            print_card(&card);
        }

        Commands::StartTx { caller } => {
            let controller = FrameController::new(config, Arc::new(chain), Arc::new(fetcher));
            let ctx = RequestContext::now(Some(caller));
            print_transaction(controller.build_start_auction_transaction(&ctx).await)?;
        }

        Commands::BidTx { caller } => {
            let controller = FrameController::new(config, Arc::new(chain), Arc::new(fetcher));
            let ctx = RequestContext::now(Some(caller));
            print_transaction(controller.build_bid_transaction(&ctx).await)?;
        }
    }

    Ok(())
}
