//! Frame configuration.
//!
//! Every field defaults to the deployed mferbuilderdao values on Base, so an
//! empty JSON object is a valid configuration file.

use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pricing::IncrementRule;

/// Base mainnet.
pub const BASE_CHAIN_ID: u64 = 8453;

/// Configuration for the auction frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Title shown by frame clients
    pub title: String,
    /// EVM chain the contracts live on
    pub chain_id: u64,
    /// Auction house contract
    #[serde(with = "string_repr")]
    pub auction_address: Address,
    /// Metadata renderer contract (`tokenURI`)
    #[serde(with = "string_repr")]
    pub metadata_address: Address,
    /// Referral credited on every bid
    #[serde(with = "string_repr")]
    pub referral: Address,
    /// Opening bid when nobody has bid yet, in wei (ether string in JSON)
    #[serde(with = "ether_repr")]
    pub reserve_price: U256,
    /// How `minBidIncrement` is applied
    pub increment_rule: IncrementRule,
    /// Auction marketplace page
    pub auction_page_url: String,
    /// Share composer link on the "start next auction" card
    pub share_url_start: String,
    /// Share composer link on the bid card
    pub share_url_bid: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            title: "BuilderDAO Frames".to_string(),
            chain_id: BASE_CHAIN_ID,
            auction_address: address!("6a8289ad5cf685c8753a47ff7eaf7a22a04d6ece"),
            metadata_address: address!("aef0ca909babee9abf34d0d77c0a0a9bb16f766c"),
            referral: address!("83f2af0f0ac4412f118b31f7dd596309b25b34dd"),
            // 0.025 ether
            reserve_price: U256::from(25_000_000_000_000_000u64),
            increment_rule: IncrementRule::Divisor,
            auction_page_url: "https://nouns.build/dao/base/0xe8af882f2f5c79580230710ac0e2344070099432?referral=0x83f2af0F0aC4412F118B31f7dd596309B25b34Dd".to_string(),
            share_url_start: "https://warpcast.com/~/compose?embeds%5B%5D=https%3A%2F%2Fmferbuilderdao-frames.pages.dev%2Fapi&text=do+something+mfer!+start+the+next+mferbuilder+dao+auction+from+the+feed+-+frame+by+%40beachcrypto".to_string(),
            share_url_bid: "https://warpcast.com/~/compose?embeds%5B%5D=https%3A%2F%2Fmferbuilderdao-frames.pages.dev%2Fapi&text=do+something+mfer!+start+or+bid+on+mferbuilder+dao+auctions+from+the+feed+-+frame+by+%40beachcrypto".to_string(),
        }
    }
}

impl FrameConfig {
    /// Load a configuration file, filling missing fields with defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Errors from loading a [`FrameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

mod string_repr {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(D::Error::custom)
    }
}

mod ether_repr {
    use alloy::primitives::U256;
    use auction_types::{format_ether, parse_ether};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_ether(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let s = String::deserialize(d)?;
        parse_ether(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = FrameConfig::from_json("{}").unwrap();
        assert_eq!(config, FrameConfig::default());
        assert_eq!(config.chain_id, 8453);
        assert_eq!(config.increment_rule, IncrementRule::Divisor);
    }

    #[test]
    fn test_partial_override() {
        let config = FrameConfig::from_json(
            r#"{
                "chain_id": 84532,
                "reserve_price": "0.1",
                "increment_rule": "percent",
                "auction_address": "0x03855976fcb91bf23110e2c425dcfb1ba0635b79"
            }"#,
        )
        .unwrap();

        assert_eq!(config.chain_id, 84532);
        assert_eq!(config.reserve_price, U256::from(100_000_000_000_000_000u64));
        assert_eq!(config.increment_rule, IncrementRule::Percent);
        assert_eq!(
            config.auction_address,
            address!("03855976fcb91bf23110e2c425dcfb1ba0635b79")
        );
        assert_eq!(config.referral, FrameConfig::default().referral);
    }

    #[test]
    fn test_json_roundtrip_keeps_reserve_price() {
        let json = serde_json::to_string(&FrameConfig::default()).unwrap();
        assert!(json.contains(r#""reserve_price":"0.025""#));
        assert_eq!(FrameConfig::from_json(&json).unwrap(), FrameConfig::default());
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(matches!(
            FrameConfig::from_json(r#"{"referral":"0x1234"}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
