use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    balance::{Asset, BalanceError, BalanceSource, FetchTicket},
    exchange::{FeeSchedule, OnchainFee, OnchainFeeKind, TokenInfo, TransferFee},
    form::{ConfirmError, DepositForm, FormConfig, SendForm, WithdrawForm},
    units::{ConversionError, parse_wei},
};

use super::{
    csv_parser::{EventKind, FormKind, NameDirectory, ScriptEvent},
    csv_printer::Confirmation,
};

/// Account the scripted deposit form is bound to.
pub const SCRIPT_ACCOUNT: &str = "0x0000000000000000000000000000000000000001";
/// Asset every scripted form works with.
pub const SCRIPT_SYMBOL: &str = "ETH";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{event:?} requires a value")]
    MissingValue { event: EventKind },
    #[error("`{value}` is not a valid value for {event:?}")]
    InvalidValue { event: EventKind, value: String },
    #[error("{event:?} is not supported by the {form:?} form")]
    Unsupported { form: FormKind, event: EventKind },
    #[error(transparent)]
    Confirm(#[from] ConfirmError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
}

/// On-chain balances as set by the script.
#[derive(Debug, Default)]
struct ScriptedBalances {
    balances: HashMap<String, Decimal>,
}

impl BalanceSource for ScriptedBalances {
    fn fetch_balance(
        &mut self,
        _account: &str,
        symbol: &str,
        _supported_tokens: &[TokenInfo],
    ) -> Result<Decimal, BalanceError> {
        self.balances
            .get(symbol)
            .copied()
            .ok_or_else(|| BalanceError::FetchFailed {
                symbol: symbol.to_owned(),
                reason: "no balance on record".to_owned(),
            })
    }
}

fn script_asset() -> Asset {
    Asset {
        symbol: SCRIPT_SYMBOL.to_owned(),
        balance: Decimal::ZERO,
        decimals: 18,
        precision: 4,
    }
}

/// One deposit, one withdraw and one send form driven by script events.
pub struct FormSession {
    started: Instant,
    names: NameDirectory,
    on_chain: ScriptedBalances,
    deposit: DepositForm,
    deposit_asset: Asset,
    withdraw: WithdrawForm,
    withdraw_asset: Asset,
    send: SendForm,
    send_asset: Asset,
    send_fee: Option<Decimal>,
}

impl FormSession {
    pub fn new(config: FormConfig, names: NameDirectory, started: Instant) -> Self {
        let mut deposit = DepositForm::new(config);
        deposit.set_account(Some(SCRIPT_ACCOUNT.to_owned()));
        deposit.set_asset(script_asset());
        deposit.set_supported_tokens(tokens_for(&script_asset()));

        Self {
            started,
            names,
            on_chain: ScriptedBalances::default(),
            deposit,
            deposit_asset: script_asset(),
            withdraw: WithdrawForm::new(config),
            withdraw_asset: script_asset(),
            send: SendForm::new(config),
            send_asset: script_asset(),
            send_fee: None,
        }
    }

    pub fn deposit(&self) -> &DepositForm {
        &self.deposit
    }

    pub fn withdraw(&self) -> &WithdrawForm {
        &self.withdraw
    }

    pub fn send(&self) -> &SendForm {
        &self.send
    }

    /// Applies one event, returning what got confirmed, if anything.
    pub fn apply(&mut self, event: &ScriptEvent) -> Result<Option<Confirmation>, ScriptError> {
        let now = self.started + Duration::from_millis(event.at_ms);
        // lookups that came due before this event settle first
        self.send.drive(now, &mut self.names);
        debug!(form = ?event.form, event = ?event.event, at_ms = event.at_ms, "script event");

        match event.form {
            FormKind::Deposit => self.apply_deposit(event),
            FormKind::Withdraw => self.apply_withdraw(event),
            FormKind::Send => self.apply_send(event, now),
        }
    }

    fn apply_deposit(&mut self, event: &ScriptEvent) -> Result<Option<Confirmation>, ScriptError> {
        match event.event {
            EventKind::Open => {
                let ticket = self.deposit.open();
                self.settle_deposit(ticket)?;
            }
            EventKind::Close => self.deposit.close(),
            EventKind::Balance => {
                let wei = parse_wei(required(event)?)?;
                self.on_chain.balances.insert(self.deposit_asset.symbol.clone(), wei);
                self.deposit_asset.balance = wei;
                let ticket = self.deposit.set_asset(self.deposit_asset.clone());
                self.settle_deposit(ticket)?;
            }
            EventKind::Decimals => {
                self.deposit_asset.decimals = parse_number(event)?;
                self.deposit.set_asset(self.deposit_asset.clone());
                let ticket = self
                    .deposit
                    .set_supported_tokens(tokens_for(&self.deposit_asset));
                self.settle_deposit(ticket)?;
            }
            EventKind::Amount => self.deposit.on_amount_input(value(event)),
            EventKind::Tick => {}
            EventKind::Confirm => {
                let amount = self.deposit.confirm()?;
                return Ok(Some(Confirmation {
                    form: FormKind::Deposit,
                    receiver: String::new(),
                    amount: amount.to_owned(),
                    memo: String::new(),
                }));
            }
            EventKind::Precision | EventKind::Fee | EventKind::Receiver | EventKind::Memo => {
                return Err(unsupported(event));
            }
        }
        Ok(None)
    }

    fn settle_deposit(&mut self, ticket: Option<FetchTicket>) -> Result<(), ScriptError> {
        let Some(ticket) = ticket else {
            return Ok(());
        };
        let wei = self.on_chain.fetch_balance(
            &ticket.key.account,
            &ticket.key.symbol,
            &tokens_for(&self.deposit_asset),
        )?;
        self.deposit.apply_balance(&ticket, wei)?;
        Ok(())
    }

    fn apply_withdraw(&mut self, event: &ScriptEvent) -> Result<Option<Confirmation>, ScriptError> {
        match event.event {
            EventKind::Open => self.withdraw.open(),
            EventKind::Close => self.withdraw.close(),
            EventKind::Balance => {
                self.withdraw_asset.balance = parse_wei(required(event)?)?;
                self.withdraw.set_asset(&self.withdraw_asset)?;
            }
            EventKind::Decimals => {
                self.withdraw_asset.decimals = parse_number(event)?;
                self.withdraw.set_asset(&self.withdraw_asset)?;
            }
            EventKind::Precision => {
                self.withdraw_asset.precision = parse_number(event)?;
                self.withdraw.set_asset(&self.withdraw_asset)?;
            }
            EventKind::Fee => {
                let fees = FeeSchedule {
                    transfer_fees: vec![],
                    onchain_fees: vec![OnchainFee {
                        kind: OnchainFeeKind::Withdraw,
                        fee: Some(parse_wei(required(event)?)?),
                    }],
                };
                self.withdraw.set_fees(&fees)?;
            }
            EventKind::Amount => self.withdraw.on_amount_input(value(event)),
            EventKind::Tick => {}
            EventKind::Confirm => {
                let amount = self.withdraw.confirm()?;
                return Ok(Some(Confirmation {
                    form: FormKind::Withdraw,
                    receiver: String::new(),
                    amount: amount.to_owned(),
                    memo: String::new(),
                }));
            }
            EventKind::Receiver | EventKind::Memo => return Err(unsupported(event)),
        }
        Ok(None)
    }

    fn apply_send(
        &mut self,
        event: &ScriptEvent,
        now: Instant,
    ) -> Result<Option<Confirmation>, ScriptError> {
        match event.event {
            EventKind::Close => self.send.reset(),
            EventKind::Balance => {
                self.send_asset.balance = parse_wei(required(event)?)?;
                self.select_send_asset()?;
            }
            EventKind::Decimals => {
                self.send_asset.decimals = parse_number(event)?;
                self.select_send_asset()?;
            }
            EventKind::Fee => {
                self.send_fee = Some(parse_wei(required(event)?)?);
                self.select_send_asset()?;
            }
            EventKind::Amount => self.send.on_amount_input(value(event)),
            EventKind::Receiver => self.send.on_receiver_input(value(event), now),
            EventKind::Memo => self.send.on_memo_input(value(event)),
            EventKind::Tick => {}
            EventKind::Confirm => {
                let request = self.send.confirm()?;
                return Ok(Some(Confirmation {
                    form: FormKind::Send,
                    receiver: request.receiver,
                    amount: request.amount,
                    memo: request.memo,
                }));
            }
            EventKind::Open | EventKind::Precision => return Err(unsupported(event)),
        }
        Ok(None)
    }

    fn select_send_asset(&mut self) -> Result<(), ScriptError> {
        let fees = FeeSchedule {
            transfer_fees: self
                .send_fee
                .map(|fee| TransferFee {
                    token: self.send_asset.symbol.clone(),
                    fee,
                })
                .into_iter()
                .collect(),
            onchain_fees: vec![],
        };
        self.send
            .set_asset(&self.send_asset, &fees, &tokens_for(&self.send_asset))?;
        Ok(())
    }
}

fn tokens_for(asset: &Asset) -> Vec<TokenInfo> {
    vec![TokenInfo {
        symbol: asset.symbol.clone(),
        decimals: asset.decimals,
    }]
}

fn value(event: &ScriptEvent) -> &str {
    event.value.as_deref().unwrap_or_default()
}

fn required(event: &ScriptEvent) -> Result<&str, ScriptError> {
    event
        .value
        .as_deref()
        .ok_or(ScriptError::MissingValue { event: event.event })
}

fn parse_number(event: &ScriptEvent) -> Result<u32, ScriptError> {
    let value = required(event)?;
    value.parse().map_err(|_| ScriptError::InvalidValue {
        event: event.event,
        value: value.to_owned(),
    })
}

fn unsupported(event: &ScriptEvent) -> ScriptError {
    ScriptError::Unsupported {
        form: event.form,
        event: event.event,
    }
}

#[cfg(test)]
mod tests {
    use crate::amount::AmountError;

    use super::*;

    fn event(form: FormKind, kind: EventKind, value: Option<&str>, at_ms: u64) -> ScriptEvent {
        ScriptEvent {
            form,
            event: kind,
            value: value.map(ToOwned::to_owned),
            at_ms,
        }
    }

    #[test]
    fn deposit_uses_fetched_balance() {
        let mut session = FormSession::new(FormConfig::default(), NameDirectory::default(), Instant::now());
        session
            .apply(&event(FormKind::Deposit, EventKind::Balance, Some("2000000000000000000"), 0))
            .unwrap();
        // closed form does not fetch
        assert_eq!(session.deposit().balance(), Decimal::ZERO);

        session
            .apply(&event(FormKind::Deposit, EventKind::Open, None, 10))
            .unwrap();
        assert_eq!(session.deposit().balance(), Decimal::from(2));

        session
            .apply(&event(FormKind::Deposit, EventKind::Amount, Some("3"), 20))
            .unwrap();
        let confirmation = session
            .apply(&event(FormKind::Deposit, EventKind::Confirm, None, 30))
            .unwrap()
            .unwrap();
        assert_eq!(confirmation.amount, "2.0000");
    }

    #[test]
    fn rejects_unsupported_events() {
        let mut session = FormSession::new(FormConfig::default(), NameDirectory::default(), Instant::now());
        let err = session
            .apply(&event(FormKind::Deposit, EventKind::Memo, Some("x"), 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Unsupported {
                form: FormKind::Deposit,
                event: EventKind::Memo
            }
        ));
        let err = session
            .apply(&event(FormKind::Withdraw, EventKind::Precision, Some("x"), 0))
            .unwrap_err();
        assert_eq!(err.to_string(), "`x` is not a valid value for Precision");
        let err = session
            .apply(&event(FormKind::Withdraw, EventKind::Confirm, None, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Confirm(ConfirmError::Amount(AmountError::Empty))
        ));
    }
}
