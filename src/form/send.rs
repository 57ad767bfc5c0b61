use std::time::Instant;

use rust_decimal::Decimal;

use crate::{
    amount::check_confirmable,
    balance::Asset,
    exchange::{FeeSchedule, TokenInfo},
    receiver::{AddressResolver, LookupRequest, LookupSeq, ReceiverField},
    units::ConversionError,
};

use super::{AmountField, ConfirmError, FormConfig, fee_text};

/// A transfer the user confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub receiver: String,
    pub amount: String,
    pub memo: String,
}

/// Transfer form: receiver (address or name), amount and memo.
#[derive(Debug)]
pub struct SendForm {
    config: FormConfig,
    symbol: Option<String>,
    receiver: ReceiverField,
    amount: AmountField,
    memo: String,
    fee: Option<Decimal>,
}

impl Default for SendForm {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}

impl SendForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            symbol: None,
            receiver: ReceiverField::new(config.debounce),
            amount: AmountField::default(),
            memo: String::new(),
            fee: None,
        }
    }

    /// Selects the asset to send and picks its transfer fee.
    pub fn set_asset(
        &mut self,
        asset: &Asset,
        fees: &FeeSchedule,
        tokens: &[TokenInfo],
    ) -> Result<(), ConversionError> {
        self.amount.set_balance(asset.display_balance()?);
        self.fee = fees.transfer_fee(&asset.symbol, tokens)?;
        self.symbol = Some(asset.symbol.clone());
        Ok(())
    }

    pub fn on_receiver_input(&mut self, raw: &str, now: Instant) {
        self.receiver.update(raw, now);
    }

    /// Lookup to perform now, once the debounce interval has elapsed.
    pub fn poll_lookup(&mut self, now: Instant) -> Option<LookupRequest> {
        self.receiver.poll(now)
    }

    pub fn complete_lookup(&mut self, seq: LookupSeq, address: Option<String>) -> bool {
        self.receiver.complete(seq, address)
    }

    /// Runs a due lookup against `resolver`.
    pub fn drive<R>(&mut self, now: Instant, resolver: &mut R) -> bool
    where
        R: AddressResolver + ?Sized,
    {
        self.receiver.drive(now, resolver)
    }

    pub fn on_amount_input(&mut self, raw: &str) {
        self.amount.update(raw);
    }

    pub fn on_memo_input(&mut self, memo: &str) {
        self.memo = memo.to_owned();
    }

    pub fn receiver(&self) -> &ReceiverField {
        &self.receiver
    }

    pub fn amount(&self) -> &str {
        self.amount.value()
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn balance(&self) -> Decimal {
        self.amount.balance()
    }

    pub fn max_hint(&self) -> String {
        self.amount.max_hint(self.config.display_decimals)
    }

    pub fn fee(&self) -> Option<Decimal> {
        self.fee
    }

    /// Fee line with the asset symbol, e.g. `0.25 USDT`.
    pub fn fee_text(&self) -> Option<String> {
        let amount = fee_text(self.fee, self.config.display_decimals)?;
        Some(match &self.symbol {
            Some(symbol) => format!("{amount} {symbol}"),
            None => amount,
        })
    }

    pub fn can_confirm(&self) -> bool {
        self.confirm().is_ok()
    }

    pub fn confirm(&self) -> Result<TransferRequest, ConfirmError> {
        if self.receiver.input().is_empty() {
            return Err(ConfirmError::MissingReceiver);
        }
        check_confirmable(self.amount.value())?;
        if let Some(err) = self.receiver.error() {
            return Err(err.clone().into());
        }
        if self.receiver.is_resolving() {
            return Err(ConfirmError::Resolving);
        }
        let receiver = self
            .receiver
            .resolved()
            .ok_or(ConfirmError::MissingReceiver)?;
        Ok(TransferRequest {
            receiver: receiver.to_owned(),
            amount: self.amount.value().to_owned(),
            memo: self.memo.clone(),
        })
    }

    /// Clears every field and abandons any pending lookup.
    pub fn reset(&mut self) {
        self.receiver.reset();
        self.amount.clear();
        self.memo.clear();
    }
}
