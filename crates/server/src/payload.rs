//! Frame action payloads posted by frame clients.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Body of a frame button press.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameActionPayload {
    pub untrusted_data: UntrustedData,
    pub trusted_data: Option<TrustedData>,
}

/// Client-reported interaction data. Not authenticated.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UntrustedData {
    pub fid: Option<u64>,
    pub url: Option<String>,
    pub message_hash: Option<String>,
    pub timestamp: Option<u64>,
    pub network: Option<u64>,
    pub button_index: Option<u32>,
    pub input_text: Option<String>,
    pub state: Option<String>,
    /// Connected wallet, present on transaction requests
    pub address: Option<String>,
    pub transaction_id: Option<String>,
    pub cast_id: Option<CastId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CastId {
    pub fid: u64,
    pub hash: String,
}

/// Signed Farcaster message, hex encoded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedData {
    pub message_bytes: String,
}

impl FrameActionPayload {
    /// Connected wallet as reported by the client.
    pub fn untrusted_address(&self) -> Option<Address> {
        self.untrusted_data
            .address
            .as_deref()
            .and_then(|a| a.parse().ok())
    }

    pub fn message_bytes(&self) -> Option<&str> {
        self.trusted_data
            .as_ref()
            .map(|t| t.message_bytes.as_str())
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_transaction_press() {
        let payload: FrameActionPayload = serde_json::from_str(
            r#"{
                "untrustedData": {
                    "fid": 2,
                    "url": "https://frame.example/api/join",
                    "messageHash": "0xd2b1",
                    "timestamp": 1706243218,
                    "network": 1,
                    "buttonIndex": 1,
                    "castId": { "fid": 226, "hash": "0xa48d" },
                    "address": "0x83f2af0f0ac4412f118b31f7dd596309b25b34dd"
                },
                "trustedData": { "messageBytes": "0a4c0801" }
            }"#,
        )
        .unwrap();

        assert_eq!(payload.untrusted_data.button_index, Some(1));
        assert_eq!(
            payload.untrusted_address().unwrap().to_string().to_lowercase(),
            "0x83f2af0f0ac4412f118b31f7dd596309b25b34dd"
        );
        assert_eq!(payload.message_bytes(), Some("0a4c0801"));
    }

    #[test]
    fn test_tolerates_sparse_payload() {
        let payload: FrameActionPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.untrusted_address().is_none());
        assert!(payload.message_bytes().is_none());

        let payload: FrameActionPayload =
            serde_json::from_str(r#"{"untrustedData":{"address":"not-an-address"}}"#).unwrap();
        assert!(payload.untrusted_address().is_none());
    }
}
