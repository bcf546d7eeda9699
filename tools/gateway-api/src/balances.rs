//! Request and response shapes for `POST /v1/balances`.

use alloy_primitives::U256;
use gateway_intent_types::USDC_DECIMALS;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSource {
    pub domain: u32,
    pub depositor: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BalancesRequest<'a> {
    pub token: &'a str,
    pub sources: &'a [BalanceSource],
}

/// One domain's deposited balance, in whole tokens (`"5.00"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainBalance {
    pub domain: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depositor: Option<String>,
    pub balance: Decimal,
}

/// Balances as reported by Gateway. Figures are advisory; the API decides at submit time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(default)]
    pub token: Option<String>,
    pub balances: Vec<DomainBalance>,
}

impl Balances {
    /// Sum over every domain, exact in decimal.
    pub fn unified(&self) -> Decimal {
        self.balances.iter().map(|b| b.balance).sum()
    }

    pub fn for_domain(&self, domain: u32) -> Decimal {
        self.balances
            .iter()
            .filter(|b| b.domain == domain)
            .map(|b| b.balance)
            .sum()
    }

    /// Whether `domain` holds enough to burn `value + max_fee` (6-decimal base units).
    pub fn covers(&self, domain: u32, value: U256, max_fee: U256) -> bool {
        match units_to_decimal(value.saturating_add(max_fee)) {
            Some(needed) => self.for_domain(domain) >= needed,
            None => false,
        }
    }
}

/// Base units to whole tokens; `None` when the amount does not fit a `Decimal`.
pub fn units_to_decimal(units: U256) -> Option<Decimal> {
    let units = u128::try_from(units).ok()?;
    let units = i128::try_from(units).ok()?;
    Decimal::try_from_i128_with_scale(units, USDC_DECIMALS).ok()
}
