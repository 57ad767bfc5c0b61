use chrono::DateTime;
use rust_decimal::Decimal;

use crate::units::format_amount;

/// Fraction digits shown for history amounts.
pub const HISTORY_DECIMALS: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Deposit,
    Withdrawal,
    Sent,
    Received,
}

impl Direction {
    /// Whether the account gains funds.
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::Received)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub direction: Direction,
    pub symbol: String,
    /// In display units.
    pub amount: Decimal,
    pub memo: Option<String>,
    /// Milliseconds since the unix epoch.
    pub timestamp_ms: i64,
    /// Confirmation progress as reported by the exchange, e.g. `"40%"`.
    pub progress: Option<String>,
}

/// Fiat price of one unit of an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiatQuote {
    pub symbol: String,
    pub fiat_value: Decimal,
}

pub fn fiat_value_for(quotes: &[FiatQuote], symbol: &str) -> Decimal {
    quotes
        .iter()
        .find(|quote| quote.symbol == symbol)
        .map_or(Decimal::ZERO, |quote| quote.fiat_value)
}

/// One history line, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRow {
    pub direction: Direction,
    pub label: String,
    pub in_progress: bool,
    pub amount_text: String,
    pub fiat_text: String,
    pub time_text: String,
}

impl TransactionRow {
    pub fn render(record: &TransactionRecord, quotes: &[FiatQuote], fiat_symbol: &str) -> Self {
        let label = match record.direction {
            Direction::Deposit => "Deposit".to_string(),
            Direction::Withdrawal => "Withdrawal".to_string(),
            Direction::Sent | Direction::Received => record
                .memo
                .as_deref()
                .filter(|memo| !memo.is_empty())
                .unwrap_or("-")
                .to_string(),
        };
        let in_progress = record
            .progress
            .as_deref()
            .is_some_and(|progress| !progress.is_empty() && progress != "100%");
        let sign = if record.direction.is_credit() { "+" } else { "-" };
        let fiat = record
            .amount
            .checked_mul(fiat_value_for(quotes, &record.symbol))
            .unwrap_or_default();

        Self {
            direction: record.direction,
            label,
            in_progress,
            amount_text: format!(
                "{sign}{} {}",
                format_amount(record.amount, HISTORY_DECIMALS),
                record.symbol
            ),
            fiat_text: format!(
                "{sign}{} {fiat_symbol}",
                format_amount(fiat, HISTORY_DECIMALS)
            ),
            time_text: short_datetime(record.timestamp_ms),
        }
    }

    /// Label with the progress marker appended while pending.
    pub fn title(&self) -> String {
        if self.in_progress {
            format!("{} (in progress)", self.label)
        } else {
            self.label.clone()
        }
    }
}

/// Short date and time in UTC, e.g. `10/14/1983, 1:30 PM`.
fn short_datetime(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(time) => time.format("%-m/%-d/%Y, %-I:%M %p").to_string(),
        None => "-".to_string(),
    }
}
