use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    amount::check_confirmable,
    balance::{Asset, BalanceError, BalanceSource, BalanceTracker, FetchKey, FetchTicket},
    exchange::TokenInfo,
    units::{ConversionError, wei_to_ether},
};

use super::{AmountField, ConfirmError, FormConfig};

/// Deposit form. The amount is capped by the account's on-chain balance,
/// which is fetched whenever the account, asset or token list changes.
#[derive(Debug, Default)]
pub struct DepositForm {
    config: FormConfig,
    open: bool,
    account: Option<String>,
    asset: Option<Asset>,
    supported_tokens: Vec<TokenInfo>,
    tracker: BalanceTracker,
    amount: AmountField,
}

impl DepositForm {
    pub fn new(config: FormConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Opens the form, returning the balance fetch to perform if one is due.
    pub fn open(&mut self) -> Option<FetchTicket> {
        self.open = true;
        self.refresh()
    }

    /// Closes the form, dropping the amount and the fetched balance.
    pub fn close(&mut self) {
        self.open = false;
        self.tracker.reset();
        self.amount.set_balance(Decimal::ZERO);
        self.amount.clear();
    }

    pub fn set_account(&mut self, account: Option<String>) -> Option<FetchTicket> {
        self.account = account;
        self.refresh()
    }

    pub fn set_asset(&mut self, asset: Asset) -> Option<FetchTicket> {
        self.asset = Some(asset);
        self.refresh()
    }

    pub fn set_supported_tokens(&mut self, tokens: Vec<TokenInfo>) -> Option<FetchTicket> {
        self.supported_tokens = tokens;
        self.refresh()
    }

    /// Key of the balance this form currently needs.
    pub fn fetch_key(&self) -> Option<FetchKey> {
        let account = self.account.as_ref()?;
        let asset = self.asset.as_ref()?;
        if self.supported_tokens.is_empty() {
            return None;
        }
        Some(FetchKey {
            account: account.clone(),
            symbol: asset.symbol.clone(),
        })
    }

    fn refresh(&mut self) -> Option<FetchTicket> {
        if !self.open {
            return None;
        }
        let key = self.fetch_key()?;
        // the previous selection's balance must not cap the new one
        self.amount.set_balance(Decimal::ZERO);
        Some(self.tracker.request(key))
    }

    /// Applies a fetched smallest-unit balance. Answers to superseded
    /// fetches are ignored and reported as `false`.
    pub fn apply_balance(
        &mut self,
        ticket: &FetchTicket,
        wei: Decimal,
    ) -> Result<bool, ConversionError> {
        let Some(asset) = &self.asset else {
            return Ok(false);
        };
        if asset.symbol != ticket.key.symbol {
            debug!(symbol = %ticket.key.symbol, "balance for a deselected asset discarded");
            return Ok(false);
        }
        if !self.tracker.is_latest(ticket) {
            debug!(seq = ticket.seq, "stale balance response discarded");
            return Ok(false);
        }
        let balance = match wei_to_ether(wei, asset.decimals) {
            Ok(balance) => balance,
            Err(err) => {
                // nothing else will answer this ticket
                self.tracker.reset();
                return Err(err);
            }
        };
        self.tracker.accept(ticket, wei);
        self.amount.set_balance(balance);
        Ok(true)
    }

    /// Fetches the balance for the current selection and applies it.
    pub fn fetch_balance<S>(&mut self, source: &mut S) -> Result<bool, BalanceError>
    where
        S: BalanceSource + ?Sized,
    {
        let Some(ticket) = self.refresh() else {
            return Ok(false);
        };
        let wei = source.fetch_balance(
            &ticket.key.account,
            &ticket.key.symbol,
            &self.supported_tokens,
        )?;
        Ok(self.apply_balance(&ticket, wei)?)
    }

    pub fn on_amount_input(&mut self, raw: &str) {
        self.amount.update(raw);
    }

    pub fn amount(&self) -> &str {
        self.amount.value()
    }

    /// Balance in display units, zero until a fetch has been applied.
    pub fn balance(&self) -> Decimal {
        self.amount.balance()
    }

    /// True while a balance fetch is outstanding.
    pub fn is_balance_pending(&self) -> bool {
        self.tracker.is_pending()
    }

    pub fn max_hint(&self) -> String {
        self.amount.max_hint(self.config.display_decimals)
    }

    pub fn can_confirm(&self) -> bool {
        self.confirm().is_ok()
    }

    /// Amount to deposit, if the form may be confirmed.
    pub fn confirm(&self) -> Result<&str, ConfirmError> {
        if self.tracker.is_pending() {
            return Err(ConfirmError::BalancePending);
        }
        check_confirmable(self.amount.value())?;
        Ok(self.amount.value())
    }
}
