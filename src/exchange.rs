use rust_decimal::Decimal;
use tracing::warn;

use crate::units::{ConversionError, wei_to_ether};

/// Decimals the exchange uses for on-chain fees, which are paid in ether.
pub const ONCHAIN_FEE_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u32,
}

/// Looks a token up in the exchange's supported token list.
pub fn token_by_symbol<'a>(symbol: &str, tokens: &'a [TokenInfo]) -> Option<&'a TokenInfo> {
    tokens.iter().find(|token| token.symbol == symbol)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFee {
    pub token: String,
    /// In the token's smallest unit.
    pub fee: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnchainFeeKind {
    Deposit,
    Withdraw,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnchainFee {
    pub kind: OnchainFeeKind,
    /// In wei, absent when the exchange has not published it yet.
    pub fee: Option<Decimal>,
}

/// Fee schedule published by the exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    pub transfer_fees: Vec<TransferFee>,
    pub onchain_fees: Vec<OnchainFee>,
}

impl FeeSchedule {
    /// Fee for an off-chain transfer of `symbol`, in display units.
    pub fn transfer_fee(
        &self,
        symbol: &str,
        tokens: &[TokenInfo],
    ) -> Result<Option<Decimal>, ConversionError> {
        let Some(wrapped) = self.transfer_fees.iter().find(|fee| fee.token == symbol) else {
            return Ok(None);
        };
        let Some(token) = token_by_symbol(symbol, tokens) else {
            warn!(symbol, "transfer fee published for an unsupported token");
            return Ok(None);
        };
        wei_to_ether(wrapped.fee, token.decimals).map(Some)
    }

    /// Fee for an on-chain withdrawal, in ether.
    pub fn withdraw_fee(&self) -> Result<Option<Decimal>, ConversionError> {
        self.onchain_fees
            .iter()
            .find(|fee| fee.kind == OnchainFeeKind::Withdraw)
            .and_then(|fee| fee.fee)
            .map(|fee| wei_to_ether(fee, ONCHAIN_FEE_DECIMALS))
            .transpose()
    }
}
