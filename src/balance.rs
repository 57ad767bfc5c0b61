use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    exchange::TokenInfo,
    units::{ConversionError, wei_to_ether},
};

/// An asset as the dashboard lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub symbol: String,
    /// Smallest-unit balance.
    pub balance: Decimal,
    pub decimals: u32,
    /// Fraction digits the exchange accepts for this asset.
    pub precision: u32,
}

impl Asset {
    pub fn display_balance(&self) -> Result<Decimal, ConversionError> {
        wei_to_ether(self.balance, self.decimals)
    }
}

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Failed to fetch {symbol} balance: {reason}")]
    FetchFailed { symbol: String, reason: String },
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Source of on-chain balances.
pub trait BalanceSource {
    /// Returns the smallest-unit balance of `symbol` held by `account`.
    fn fetch_balance(
        &mut self,
        account: &str,
        symbol: &str,
        supported_tokens: &[TokenInfo],
    ) -> Result<Decimal, BalanceError>;
}

/// What a balance fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub account: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub key: FetchKey,
}

/// Keeps the balance of the currently selected account and asset.
///
/// Every fetch gets a ticket; a response is only adopted when it carries the
/// latest ticket, so a slow answer for a previous selection can never
/// overwrite the balance of the current one.
#[derive(Debug, Default)]
pub struct BalanceTracker {
    next_seq: u64,
    latest: Option<FetchTicket>,
    balance: Option<Decimal>,
}

impl BalanceTracker {
    pub fn request(&mut self, key: FetchKey) -> FetchTicket {
        self.next_seq += 1;
        let ticket = FetchTicket {
            seq: self.next_seq,
            key,
        };
        debug!(seq = ticket.seq, symbol = %ticket.key.symbol, "balance fetch issued");
        self.latest = Some(ticket.clone());
        self.balance = None;
        ticket
    }

    pub fn is_latest(&self, ticket: &FetchTicket) -> bool {
        self.latest.as_ref() == Some(ticket)
    }

    /// Adopts `balance` if `ticket` is still the latest one.
    pub fn accept(&mut self, ticket: &FetchTicket, balance: Decimal) -> bool {
        if !self.is_latest(ticket) {
            debug!(seq = ticket.seq, symbol = %ticket.key.symbol, "stale balance response discarded");
            return false;
        }
        self.balance = Some(balance);
        true
    }

    /// Smallest-unit balance from the latest adopted response.
    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some() && self.balance.is_none()
    }

    /// Forgets the balance and invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.latest = None;
        self.balance = None;
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    fn key(account: &str, symbol: &str) -> FetchKey {
        FetchKey {
            account: account.to_string(),
            symbol: symbol.to_string(),
        }
    }

    #[test]
    fn converts_asset_balance() {
        let asset = Asset {
            symbol: "USDT".to_string(),
            balance: Decimal::from_u64(12_345_678).unwrap(),
            decimals: 6,
            precision: 2,
        };
        assert_eq!(
            asset.display_balance().unwrap(),
            Decimal::new(12_345_678, 6)
        );
    }

    #[test]
    fn adopts_latest_response() {
        let mut tracker = BalanceTracker::default();
        let ticket = tracker.request(key("0xa", "ETH"));
        assert!(tracker.is_pending());
        assert!(tracker.is_latest(&ticket));
        assert!(tracker.accept(&ticket, Decimal::from_u32(5).unwrap()));
        assert_eq!(tracker.balance(), Some(Decimal::from_u32(5).unwrap()));
        assert!(!tracker.is_pending());
    }

    #[test]
    fn discards_stale_responses() {
        let mut tracker = BalanceTracker::default();
        let eth = tracker.request(key("0xa", "ETH"));
        let usdt = tracker.request(key("0xa", "USDT"));

        assert!(!tracker.is_latest(&eth));
        assert!(tracker.accept(&usdt, Decimal::from_u32(7).unwrap()));
        // ETH answer arrives late
        assert!(!tracker.accept(&eth, Decimal::from_u32(100).unwrap()));
        assert_eq!(tracker.balance(), Some(Decimal::from_u32(7).unwrap()));

        // same selection asked twice, only the second answer counts
        let first = tracker.request(key("0xa", "USDT"));
        let second = tracker.request(key("0xa", "USDT"));
        assert!(!tracker.accept(&first, Decimal::from_u32(1).unwrap()));
        assert_eq!(tracker.balance(), None);
        assert!(tracker.accept(&second, Decimal::from_u32(2).unwrap()));
    }

    #[test]
    fn reset_invalidates_tickets() {
        let mut tracker = BalanceTracker::default();
        let ticket = tracker.request(key("0xa", "ETH"));
        tracker.reset();
        assert!(!tracker.accept(&ticket, Decimal::from_u32(5).unwrap()));
        assert_eq!(tracker.balance(), None);
        assert!(!tracker.is_pending());
    }
}
