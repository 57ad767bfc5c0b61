use std::{cmp::Ordering, iter, str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy, prelude::Zero};
use thiserror::Error;
use tracing::debug;

/// Fraction digits kept when an amount is clamped down to the balance.
pub const CLAMP_DECIMALS: u32 = 4;

// ASCII digits only, `\d` would accept any unicode digit
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)?(\.[0-9]*)?$").expect("regexp should be valid")
});

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is required")]
    Empty,
    #[error("Amount is not a number")]
    NonNumeric,
    #[error("Amount must be greater than zero")]
    Zero,
}

/// Normalizes a raw amount keystroke against the available balance.
///
/// Thousands separators are dropped, anything that is not a plain
/// non-negative decimal becomes an empty string, and values above `balance`
/// are replaced by the balance rounded down to [`CLAMP_DECIMALS`] places.
/// Accepted values are otherwise returned untouched, so intermediate states
/// like `"12."` survive.
pub fn normalize(raw: &str, balance: Decimal) -> String {
    normalize_with_precision(raw, balance, None)
}

/// Same as [`normalize`], but also truncates fraction digits beyond
/// `precision` when one is given.
pub fn normalize_with_precision(raw: &str, balance: Decimal, precision: Option<u32>) -> String {
    let stripped: String = raw.chars().filter(|ch| *ch != ',').collect();
    if !DECIMAL_RE.is_match(&stripped) {
        debug!(raw, "amount input rejected");
        return String::new();
    }
    let candidate = match precision {
        Some(precision) => truncate_fraction(&stripped, precision).to_owned(),
        None => stripped,
    };
    if exceeds(&candidate, balance) {
        let decimals = precision.map_or(CLAMP_DECIMALS, |p| p.min(CLAMP_DECIMALS));
        let clamped = clamp_to(balance, decimals);
        debug!(input = %candidate, %clamped, "amount clamped to balance");
        return clamped;
    }
    candidate
}

/// Parses an accepted amount string into a number.
///
/// Returns `None` when the text carries no digit at all (`""`, `"."`), is not
/// a plain decimal, or does not fit a [`Decimal`].
pub fn parse_amount(amount: &str) -> Option<Decimal> {
    if !DECIMAL_RE.is_match(amount) || !has_digit(amount) {
        return None;
    }
    let mut text = amount.trim_end_matches('.').to_owned();
    if text.starts_with('.') {
        text.insert(0, '0');
    }
    Decimal::from_str(&text).ok()
}

/// Checks that an amount field holds something worth confirming.
pub fn check_confirmable(amount: &str) -> Result<Decimal, AmountError> {
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    let value = parse_amount(amount).ok_or(AmountError::NonNumeric)?;
    if value <= Decimal::zero() {
        return Err(AmountError::Zero);
    }
    Ok(value)
}

fn has_digit(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
}

fn truncate_fraction(amount: &str, precision: u32) -> &str {
    let Some(dot) = amount.find('.') else {
        return amount;
    };
    if precision == 0 {
        return &amount[..dot];
    }
    let end = (dot + 1 + precision as usize).min(amount.len());
    &amount[..end]
}

// Compared digit by digit: parsing into a Decimal rounds away fraction
// digits past its scale and fails on oversized integer parts.
fn exceeds(candidate: &str, balance: Decimal) -> bool {
    let balance = balance.max(Decimal::zero()).to_string();
    compare_digits(candidate, &balance) == Ordering::Greater
}

/// Orders two plain non-negative decimal strings by value.
fn compare_digits(left: &str, right: &str) -> Ordering {
    let (left_int, left_frac) = split_digits(left);
    let (right_int, right_frac) = split_digits(right);
    let width = left_frac.len().max(right_frac.len());
    let padded = |frac: &str| {
        frac.bytes()
            .chain(iter::repeat(b'0'))
            .take(width)
            .collect::<Vec<_>>()
    };

    left_int
        .len()
        .cmp(&right_int.len())
        .then_with(|| left_int.cmp(right_int))
        .then_with(|| padded(left_frac).cmp(&padded(right_frac)))
}

fn split_digits(amount: &str) -> (&str, &str) {
    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));
    (int_part.trim_start_matches('0'), frac_part)
}

fn clamp_to(balance: Decimal, decimals: u32) -> String {
    let mut rounded = balance
        .max(Decimal::zero())
        .round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    if rounded.is_zero() {
        return "0".to_string();
    }
    rounded.rescale(decimals);
    rounded.to_string()
}
