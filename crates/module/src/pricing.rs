//! Minimum next-bid calculation.
//!
//! Everything is computed in wei. Formatting to ether happens only when a
//! card is rendered.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;

/// How `minBidIncrement` is applied to the current bid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementRule {
    /// `bid + bid / increment`
    #[default]
    Divisor,
    /// `bid + bid * increment / 100`, as the auction house enforces it
    Percent,
}

/// Smallest bid the frame will offer.
///
/// With no bids yet this is the reserve price. `increment` is the raw
/// `minBidIncrement()` value.
pub fn minimum_bid(
    current_bid: U256,
    increment: U256,
    reserve_price: U256,
    rule: IncrementRule,
) -> Result<U256, FrameError> {
    if current_bid.is_zero() {
        return Ok(reserve_price);
    }

    let step = match rule {
        IncrementRule::Divisor => current_bid
            .checked_div(increment)
            .ok_or(FrameError::ZeroBidIncrement)?,
        IncrementRule::Percent => {
            current_bid
                .checked_mul(increment)
                .ok_or(FrameError::BidOverflow)?
                / U256::from(100u64)
        }
    };

    current_bid.checked_add(step).ok_or(FrameError::BidOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::parse_ether;

    fn reserve() -> U256 {
        parse_ether("0.025").unwrap()
    }

    #[test]
    fn test_no_bids_uses_reserve() {
        for increment in [0u64, 1, 10, 255] {
            let min = minimum_bid(U256::ZERO, U256::from(increment), reserve(), IncrementRule::Divisor)
                .unwrap();
            assert_eq!(min, reserve());
        }
    }

    #[test]
    fn test_divisor_rule() {
        let cases = [(100u64, 10u64, 110u64), (1_000, 3, 1_333), (7, 10, 7), (1, 1, 2)];
        for (bid, divisor, expected) in cases {
            let min = minimum_bid(
                U256::from(bid),
                U256::from(divisor),
                reserve(),
                IncrementRule::Divisor,
            )
            .unwrap();
            assert_eq!(min, U256::from(expected), "bid {} / {}", bid, divisor);
        }
    }

    #[test]
    fn test_divisor_rule_in_wei() {
        // 0.05 ether with a divisor of 10 must land exactly on 0.055 ether
        let min = minimum_bid(
            parse_ether("0.05").unwrap(),
            U256::from(10u64),
            reserve(),
            IncrementRule::Divisor,
        )
        .unwrap();
        assert_eq!(min, parse_ether("0.055").unwrap());
    }

    #[test]
    fn test_percent_rule() {
        let min = minimum_bid(
            parse_ether("1").unwrap(),
            U256::from(10u64),
            reserve(),
            IncrementRule::Percent,
        )
        .unwrap();
        assert_eq!(min, parse_ether("1.1").unwrap());
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let result = minimum_bid(U256::from(5u64), U256::ZERO, reserve(), IncrementRule::Divisor);
        assert!(matches!(result, Err(FrameError::ZeroBidIncrement)));
    }

    #[test]
    fn test_overflow_rejected() {
        let result = minimum_bid(U256::MAX, U256::from(1u64), reserve(), IncrementRule::Divisor);
        assert!(matches!(result, Err(FrameError::BidOverflow)));

        let result = minimum_bid(U256::MAX, U256::from(2u64), reserve(), IncrementRule::Percent);
        assert!(matches!(result, Err(FrameError::BidOverflow)));
    }
}
