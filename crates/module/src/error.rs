//! Controller error types.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Failure reported by a chain or metadata reader.
pub type ReadError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while serving a frame request.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Failed to read auction: {0}")]
    AuctionRead(#[source] ReadError),

    #[error("Failed to read minimum bid increment: {0}")]
    IncrementRead(#[source] ReadError),

    #[error("Failed to resolve token URI for token {token_id}: {source}")]
    TokenUri { token_id: U256, source: ReadError },

    #[error("Failed to fetch token metadata from {uri}: {source}")]
    Metadata { uri: String, source: ReadError },

    #[error("Failed to read balance of {address}: {source}")]
    Balance { address: Address, source: ReadError },

    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: U256, available: U256 },

    #[error("Minimum bid increment is zero")]
    ZeroBidIncrement,

    #[error("Minimum bid overflows")]
    BidOverflow,

    #[error("Request carries no caller address")]
    MissingCaller,
}
