//! Token metadata resolution.
//!
//! `tokenURI` may point at an HTTP document, an IPFS object or carry the
//! document inline as a `data:` URI.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::time::Duration;
use tracing::debug;

use auction_module::{MetadataFetcher, ReadError};
use auction_types::TokenMetadata;

use crate::error::ClientError;

pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const JSON_BASE64_PREFIX: &str = "data:application/json;base64,";
const JSON_UTF8_PREFIX: &str = "data:application/json;utf8,";
const JSON_PLAIN_PREFIX: &str = "data:application/json,";
const IPFS_PREFIX: &str = "ipfs://";

/// [`MetadataFetcher`] over HTTP with `data:` and `ipfs://` support.
#[derive(Clone, Debug)]
pub struct HttpMetadataFetcher {
    http: reqwest::Client,
    ipfs_gateway: String,
}

impl HttpMetadataFetcher {
    pub fn new(ipfs_gateway: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut ipfs_gateway = ipfs_gateway.into();
        if !ipfs_gateway.ends_with('/') {
            ipfs_gateway.push('/');
        }
        Ok(Self { http, ipfs_gateway })
    }

    /// Resolve `uri` into a metadata document with a fetchable image URL.
    pub async fn resolve(&self, uri: &str) -> Result<TokenMetadata, ClientError> {
        let mut metadata = match inline_document(uri)? {
            Some(document) => serde_json::from_slice::<TokenMetadata>(&document)?,
            None => self.fetch_remote(&self.gateway_url(uri)).await?,
        };
        metadata.image = self.gateway_url(&metadata.image);
        Ok(metadata)
    }

    /// Rewrite `ipfs://` references onto the configured gateway.
    pub fn gateway_url(&self, uri: &str) -> String {
        match uri.strip_prefix(IPFS_PREFIX) {
            Some(path) => format!("{}{}", self.ipfs_gateway, path.trim_start_matches("ipfs/")),
            None => uri.to_string(),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<TokenMetadata, ClientError> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ClientError::UnsupportedUri(url.to_string()));
        }

        debug!("Fetching token metadata from {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                uri: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

impl Default for HttpMetadataFetcher {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
        }
    }
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata, ReadError> {
        Ok(self.resolve(uri).await?)
    }
}

/// Body of a JSON `data:` URI, or `None` for anything else.
fn inline_document(uri: &str) -> Result<Option<Vec<u8>>, ClientError> {
    if let Some(payload) = uri.strip_prefix(JSON_BASE64_PREFIX) {
        return Ok(Some(STANDARD.decode(payload.trim())?));
    }
    if let Some(payload) = uri
        .strip_prefix(JSON_UTF8_PREFIX)
        .or_else(|| uri.strip_prefix(JSON_PLAIN_PREFIX))
    {
        return Ok(Some(payload.as_bytes().to_vec()));
    }
    if uri.starts_with("data:") {
        return Err(ClientError::UnsupportedUri(uri.chars().take(64).collect()));
    }
    Ok(None)
}
