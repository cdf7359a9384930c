//! Auction view controller for the BuilderDAO frame.
//!
//! The controller turns on-chain auction state into frame cards and
//! unsigned transactions:
//!
//! - Home: the artwork of the token being auctioned
//! - Join: the current bid and a bid button, or a "start next auction"
//!   button once the auction has ended
//! - StartAuction: `settleCurrentAndCreateNewAuction()` for the caller
//! - Mint: `createBidWithReferral(tokenId, referral)` at the minimum bid
//!
//! # Architecture
//!
//! - `call`: Frame routes
//! - `handlers`: The controller and its operations
//! - `queries`: Read seams (`ChainReader`, `MetadataFetcher`)
//! - `state`: Per-request context and snapshots
//! - `pricing`: Minimum-bid rule
//! - `cards`: The cards the frame can show
//! - `transactions`: Transaction descriptors
//! - `config`: Frame configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use auction_module::{FrameController, FrameConfig, RequestContext};
//!
//! let controller = FrameController::new(FrameConfig::default(), chain, metadata);
//! let card = controller.render_join_or_bid(&RequestContext::now(None)).await;
//! ```

pub mod call;
pub mod cards;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pricing;
pub mod queries;
pub mod state;
pub mod transactions;

pub use call::FrameRoute;
pub use config::{ConfigError, FrameConfig};
pub use error::{FrameError, ReadError};
pub use handlers::{FrameController, FrameResponse, HandlerResult};
pub use pricing::{minimum_bid, IncrementRule};
pub use queries::{ChainReader, MetadataFetcher, StaticChainReader, StaticMetadata};
pub use state::{BidSnapshot, RequestContext};
