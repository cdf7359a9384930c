//! Frame message verification against a Farcaster hub.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HUB_URL: &str = "https://hubs.airstack.xyz";
/// Header carrying the hub API token.
pub const API_TOKEN_HEADER: &str = "x-airstack-hubs";

/// What to do with a frame message the hub does not vouch for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Do not contact the hub
    Off,
    /// Verify, log failures and serve the request anyway
    #[default]
    Silent,
    /// Reject requests that fail verification
    Strict,
}

/// Errors from hub verification.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Request carries no trusted message")]
    MissingMessage,

    #[error("Trusted message is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Hub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Hub answered HTTP {0}")]
    Status(u16),

    #[error("Hub rejected the message")]
    Invalid,
}

/// Fields of a verified frame action the server relies on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatedMessage {
    pub fid: Option<u64>,
    pub button_index: Option<u32>,
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
    #[serde(default)]
    message: Option<HubMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HubMessage {
    data: HubMessageData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HubMessageData {
    fid: Option<u64>,
    frame_action_body: Option<FrameActionBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FrameActionBody {
    button_index: Option<u32>,
    address: Option<String>,
}

impl From<HubMessage> for ValidatedMessage {
    fn from(message: HubMessage) -> Self {
        let body = message.data.frame_action_body.unwrap_or_default();
        Self {
            fid: message.data.fid,
            button_index: body.button_index,
            address: body
                .address
                .as_deref()
                .filter(|a| !a.is_empty())
                .and_then(|a| a.parse().ok()),
        }
    }
}

/// Client for a hub's `validateMessage` endpoint.
#[derive(Clone, Debug)]
pub struct HubClient {
    http: reqwest::Client,
    url: String,
    api_token: Option<String>,
}

impl HubClient {
    pub fn new(
        url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, HubError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into().trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.is_empty()),
        })
    }

    /// Ask the hub whether the hex-encoded `message_bytes` is authentic.
    pub async fn validate(&self, message_bytes: &str) -> Result<ValidatedMessage, HubError> {
        let bytes = hex::decode(message_bytes.trim_start_matches("0x"))?;

        let mut request = self
            .http
            .post(format!("{}/v1/validateMessage", self.url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        if let Some(token) = &self.api_token {
            request = request.header(API_TOKEN_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Status(status.as_u16()));
        }

        let body: ValidateResponse = response.json().await?;
        debug!(valid = body.valid, "Hub validated frame message");
        parse_validation(body)
    }
}

fn parse_validation(body: ValidateResponse) -> Result<ValidatedMessage, HubError> {
    if !body.valid {
        return Err(HubError::Invalid);
    }
    Ok(body.message.map(ValidatedMessage::from).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<ValidatedMessage, HubError> {
        parse_validation(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_valid_message_yields_address() {
        let message = parse(
            r#"{
                "valid": true,
                "message": {
                    "data": {
                        "type": "MESSAGE_TYPE_FRAME_ACTION",
                        "fid": 21,
                        "frameActionBody": {
                            "url": "aHR0cHM6Ly9mcmFtZS5leGFtcGxl",
                            "buttonIndex": 1,
                            "address": "0x83f2af0f0ac4412f118b31f7dd596309b25b34dd"
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(message.fid, Some(21));
        assert_eq!(message.button_index, Some(1));
        assert!(message.address.is_some());
    }

    #[test]
    fn test_invalid_message_is_rejected() {
        assert!(matches!(parse(r#"{"valid": false}"#), Err(HubError::Invalid)));
    }

    #[test]
    fn test_missing_body_is_empty() {
        assert_eq!(parse(r#"{"valid": true}"#).unwrap(), ValidatedMessage::default());
    }

    #[tokio::test]
    async fn test_rejects_non_hex_message() {
        let hub = HubClient::new("http://127.0.0.1:9", None, Duration::from_millis(50)).unwrap();
        assert!(matches!(hub.validate("zz").await, Err(HubError::Hex(_))));
    }
}
