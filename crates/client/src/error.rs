//! Client error types.

use thiserror::Error;

/// Errors that can occur while reading chain state or token metadata.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("RPC transport error: {0}")]
    Transport(#[from] alloy::transports::TransportError),

    #[error("Contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {uri}")]
    Status { uri: String, status: u16 },

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid metadata document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported metadata URI: {0}")]
    UnsupportedUri(String),
}
