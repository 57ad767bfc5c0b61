use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Largest number of decimal places an exact [`Decimal`] can carry.
pub const MAX_DECIMALS: u32 = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{decimals} decimal places exceed the supported maximum of {max}", max = MAX_DECIMALS)]
    UnsupportedDecimals { decimals: u32 },
    #[error("`{value}` is not a non-negative integer amount")]
    InvalidWei { value: String },
    #[error("{wei} does not fit into {decimals} decimal places")]
    Overflow { wei: Decimal, decimals: u32 },
}

/// Parses a smallest-unit amount, e.g. `"1500000000000000000"`.
pub fn parse_wei(value: &str) -> Result<Decimal, ConversionError> {
    let invalid = || ConversionError::InvalidWei {
        value: value.to_owned(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    Decimal::from_str(value).map_err(|_| invalid())
}

/// Converts a smallest-unit amount into display units (`wei / 10^decimals`).
pub fn wei_to_ether(wei: Decimal, decimals: u32) -> Result<Decimal, ConversionError> {
    if decimals > MAX_DECIMALS {
        return Err(ConversionError::UnsupportedDecimals { decimals });
    }
    let unit = Decimal::from_i128_with_scale(1, decimals);
    wei.checked_mul(unit)
        .map(|value| value.normalize())
        .ok_or(ConversionError::Overflow { wei, decimals })
}

/// Rounds toward zero, so a displayed amount never overstates the real one.
pub fn round_down(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero)
}

/// Formats an amount for display: at most `decimals` fraction digits, no
/// trailing zeros, `,` between thousands.
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let rounded = round_down(value, decimals).normalize();
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut formatted = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        formatted.push('-');
    }
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(ch);
    }
    if let Some(frac_part) = frac_part {
        formatted.push('.');
        formatted.push_str(frac_part);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn converts_wei() {
        let wei = parse_wei("1500000000000000000").unwrap();
        assert_eq!(wei_to_ether(wei, 18).unwrap(), dec("1.5"));
        assert_eq!(wei_to_ether(dec("1234567"), 6).unwrap(), dec("1.234567"));
        assert_eq!(wei_to_ether(dec("42"), 0).unwrap(), dec("42"));
        assert_eq!(
            wei_to_ether(dec("123456789012345678901234"), 18).unwrap(),
            dec("123456.789012345678901234")
        );
        assert_eq!(wei_to_ether(dec("1"), 28).unwrap().to_string(), "0.0000000000000000000000000001");
    }

    #[test]
    fn rejects_unsupported_decimals() {
        assert_eq!(
            wei_to_ether(dec("1"), 30),
            Err(ConversionError::UnsupportedDecimals { decimals: 30 })
        );
        let err = wei_to_ether(dec("1"), 29).unwrap_err();
        assert_eq!(
            err.to_string(),
            "29 decimal places exceed the supported maximum of 28"
        );
    }

    #[test]
    fn rejects_malformed_wei() {
        assert!(parse_wei("").is_err());
        assert!(parse_wei("1.5").is_err());
        assert!(parse_wei("-1").is_err());
        assert!(parse_wei("0x10").is_err());
        assert!(parse_wei("999999999999999999999999999999999").is_err());
        assert_eq!(parse_wei("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(dec("1234567.891234"), 4), "1,234,567.8912");
        assert_eq!(format_amount(dec("0.00001"), 4), "0");
        assert_eq!(format_amount(dec("100.5000"), 4), "100.5");
        assert_eq!(format_amount(dec("999"), 4), "999");
        assert_eq!(format_amount(dec("1000"), 2), "1,000");
        assert_eq!(format_amount(dec("-1234.56789"), 2), "-1,234.56");
        assert_eq!(format_amount(dec("-0.00001"), 2), "0");
    }

    #[test]
    fn rounds_toward_zero() {
        assert_eq!(round_down(dec("1.99999"), 4), dec("1.9999"));
        assert_eq!(round_down(dec("-1.99999"), 4), dec("-1.9999"));
    }
}
