//! Conversions between wei amounts and decimal ether strings.
//!
//! All bid arithmetic happens in wei; these helpers exist only for
//! rendering amounts and for reading human-entered configuration.

use alloy::primitives::U256;
use thiserror::Error;

/// Number of fractional digits in one ether.
pub const ETHER_DECIMALS: usize = 18;

/// 10^18 wei.
pub const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Errors from parsing a decimal ether amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("Empty amount")]
    Empty,

    #[error("Invalid digit in amount: {0}")]
    InvalidDigit(String),

    #[error("Too many fractional digits: {0} (max 18)")]
    TooPrecise(usize),

    #[error("Amount overflows 256 bits")]
    Overflow,
}

/// Render a wei amount as ether with trailing fractional zeros removed.
///
/// `25_000_000_000_000_000` renders as `0.025`, one ether as `1`.
pub fn format_ether(wei: U256) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;

    if frac.is_zero() {
        return whole.to_string();
    }

    let digits = frac.to_string();
    let mut padded = "0".repeat(ETHER_DECIMALS - digits.len());
    padded.push_str(&digits);

    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

/// Parse a decimal ether amount (e.g. `"0.025"`) into wei.
pub fn parse_ether(amount: &str) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::Empty);
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(amount.to_string()));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooPrecise(frac.len()));
    }

    let whole = parse_digits(whole)?;
    let frac = parse_digits(&format!("{:0<width$}", frac, width = ETHER_DECIMALS))?;

    whole
        .checked_mul(WEI_PER_ETHER)
        .and_then(|w| w.checked_add(frac))
        .ok_or(UnitsError::Overflow)
}

fn parse_digits(digits: &str) -> Result<U256, UnitsError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow)
}
