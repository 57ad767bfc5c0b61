use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    amount::{AmountError, CLAMP_DECIMALS, normalize_with_precision},
    receiver::{DEFAULT_DEBOUNCE, ReceiverError},
    units::{format_amount, round_down},
};

pub mod deposit;
pub mod send;
pub mod withdraw;

pub use deposit::DepositForm;
pub use send::{SendForm, TransferRequest};
pub use withdraw::WithdrawForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormConfig {
    /// Pause before a typed name is looked up.
    pub debounce: Duration,
    /// Fraction digits shown in balance hints and fee lines.
    pub display_decimals: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            display_decimals: CLAMP_DECIMALS,
        }
    }
}

/// Why a form refuses to confirm.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmError {
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error("Receiver is required")]
    MissingReceiver,
    #[error(transparent)]
    Receiver(#[from] ReceiverError),
    #[error("Receiver is still being resolved")]
    Resolving,
    #[error("Balance is still being fetched")]
    BalancePending,
}

/// Amount input shared by every form.
#[derive(Debug, Clone, Default)]
pub(crate) struct AmountField {
    value: String,
    balance: Decimal,
    precision: Option<u32>,
}

impl AmountField {
    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn balance(&self) -> Decimal {
        self.balance
    }

    pub(crate) fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }

    pub(crate) fn set_precision(&mut self, precision: Option<u32>) {
        self.precision = precision;
    }

    pub(crate) fn update(&mut self, raw: &str) {
        self.value = normalize_with_precision(raw, self.balance, self.precision);
    }

    /// Available balance as shown under the input.
    pub(crate) fn max_hint(&self, decimals: u32) -> String {
        round_down(self.balance, decimals).normalize().to_string()
    }

    pub(crate) fn clear(&mut self) {
        self.value.clear();
    }
}

/// Fee line, hidden when there is no fee to pay.
pub(crate) fn fee_text(fee: Option<Decimal>, decimals: u32) -> Option<String> {
    fee.filter(|fee| !fee.is_zero())
        .map(|fee| format_amount(fee, decimals))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn amount_field_tracks_balance() {
        let mut field = AmountField::default();
        field.update("5");
        assert_eq!(field.value(), "0");

        field.set_balance(Decimal::from_str("12.345678").unwrap());
        field.update("1,2.3");
        assert_eq!(field.value(), "12.3");
        field.update("13");
        assert_eq!(field.value(), "12.3456");
        assert_eq!(field.max_hint(4), "12.3456");
        assert_eq!(field.max_hint(2), "12.34");

        field.set_precision(Some(2));
        field.update("1.23456");
        assert_eq!(field.value(), "1.23");
        field.clear();
        assert_eq!(field.value(), "");
    }

    #[test]
    fn hides_zero_fees() {
        assert_eq!(fee_text(None, 4), None);
        assert_eq!(fee_text(Some(Decimal::ZERO), 4), None);
        assert_eq!(
            fee_text(Some(Decimal::from_str("0.0012345").unwrap()), 4),
            Some("0.0012".to_string())
        );
    }

    #[test]
    fn confirm_errors_read_well() {
        assert_eq!(
            ConfirmError::from(AmountError::Zero).to_string(),
            "Amount must be greater than zero"
        );
        assert_eq!(
            ConfirmError::from(ReceiverError::Invalid("0x1".to_string())).to_string(),
            "`0x1` is not a valid address"
        );
    }
}
