use rust_decimal::Decimal;

use crate::{
    amount::check_confirmable,
    balance::Asset,
    exchange::FeeSchedule,
    units::ConversionError,
};

use super::{AmountField, ConfirmError, FormConfig, fee_text};

/// Withdrawal form, capped by the exchange balance of the asset and limited
/// to the asset's precision.
#[derive(Debug, Default)]
pub struct WithdrawForm {
    config: FormConfig,
    open: bool,
    amount: AmountField,
    fee: Option<Decimal>,
}

impl WithdrawForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.amount.clear();
    }

    pub fn set_asset(&mut self, asset: &Asset) -> Result<(), ConversionError> {
        self.amount.set_balance(asset.display_balance()?);
        self.amount.set_precision(Some(asset.precision));
        Ok(())
    }

    pub fn set_fees(&mut self, fees: &FeeSchedule) -> Result<(), ConversionError> {
        self.fee = fees.withdraw_fee()?;
        Ok(())
    }

    pub fn fee(&self) -> Option<Decimal> {
        self.fee
    }

    pub fn fee_text(&self) -> Option<String> {
        fee_text(self.fee, self.config.display_decimals)
    }

    pub fn on_amount_input(&mut self, raw: &str) {
        self.amount.update(raw);
    }

    pub fn amount(&self) -> &str {
        self.amount.value()
    }

    pub fn balance(&self) -> Decimal {
        self.amount.balance()
    }

    pub fn max_hint(&self) -> String {
        self.amount.max_hint(self.config.display_decimals)
    }

    pub fn can_confirm(&self) -> bool {
        self.confirm().is_ok()
    }

    /// Amount to withdraw, if the form may be confirmed.
    pub fn confirm(&self) -> Result<&str, ConfirmError> {
        check_confirmable(self.amount.value())?;
        Ok(self.amount.value())
    }
}
