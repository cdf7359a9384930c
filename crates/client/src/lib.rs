//! Readers for the BuilderDAO auction frame.
//!
//! This crate provides the production implementations of the controller's
//! read seams:
//! - `RpcChainReader`: auction house, metadata renderer and balances over
//!   Ethereum JSON-RPC
//! - `HttpMetadataFetcher`: token metadata over HTTP, IPFS and `data:` URIs

pub mod error;
pub mod metadata;
pub mod query;

pub use error::ClientError;
pub use metadata::HttpMetadataFetcher;
pub use query::RpcChainReader;
