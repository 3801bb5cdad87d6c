//! Money types with precise decimal arithmetic
//!
//! Bill amounts are represented with rust_decimal so that totals, rest
//! buckets and per-member shares never drift the way floating-point prices do.
//! Every operation that combines two amounts is checked for currency.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    RON,
    EUR,
    USD,
    GBP,
    CHF,
    HUF,
    PLN,
    JPY,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::RON => "lei",
            Currency::EUR => "€",
            Currency::USD => "$",
            Currency::GBP => "£",
            Currency::CHF => "CHF",
            Currency::HUF => "Ft",
            Currency::PLN => "zł",
            Currency::JPY => "¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::RON => "RON",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::HUF => "HUF",
            Currency::PLN => "PLN",
            Currency::JPY => "JPY",
        }
    }

    fn minor_factor(&self) -> Decimal {
        Decimal::new(10_i64.pow(self.decimal_places()), 0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Amounts keep every digit the caller supplied. Ledger inputs are
/// restricted to the currency's own precision (see
/// [`Money::fits_currency_precision`]), which keeps minor-unit splits exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value without rounding
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates Money from an integer amount in minor units (e.g., bani, cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, 0) / currency.minor_factor(), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Sums amounts that must all be in `currency`
    pub fn sum<'a, I>(amounts: I, currency: Currency) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Rounds up (towards positive infinity) to the currency's minor unit
    pub fn round_up_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.decimal_places(),
                RoundingStrategy::ToPositiveInfinity,
            ),
            currency: self.currency,
        }
    }

    /// Returns true if the amount has no digits below the currency's minor unit
    pub fn fits_currency_precision(&self) -> bool {
        self.round_to_currency().amount == self.amount
    }

    /// Returns the amount expressed in minor units
    pub fn to_minor(&self) -> Result<i64, MoneyError> {
        self.amount
            .checked_mul(self.currency.minor_factor())
            .and_then(|minor| minor.round().to_i64())
            .ok_or(MoneyError::Overflow)
    }

    /// Fails with `CurrencyMismatch` unless this amount is in `currency`
    pub fn ensure_currency(&self, currency: Currency) -> Result<(), MoneyError> {
        if self.currency != currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                currency.to_string(),
            ));
        }
        Ok(())
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        other.ensure_currency(self.currency)?;
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        other.ensure_currency(self.currency)?;
        let amount = self.amount.checked_sub(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(amount, self.currency))
    }

    /// Compares two amounts of the same currency
    pub fn checked_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        other.ensure_currency(self.currency)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Allocates the money into n equal parts in minor units.
    /// The remainder is distributed one minor unit at a time among the first parts.
    pub fn allocate(&self, n: u32) -> Result<Vec<Money>, MoneyError> {
        if n == 0 {
            return Err(MoneyError::InvalidAmount("Cannot allocate to zero parts".to_string()));
        }
        if self.is_negative() {
            return Err(MoneyError::InvalidAmount(format!(
                "Cannot allocate negative amount {}",
                self
            )));
        }

        let total_minor = self.to_minor()?;
        let parts = i64::from(n);
        let base_amount = total_minor / parts;
        let remainder = total_minor % parts;

        Ok((0..parts)
            .map(|i| {
                let minor = if i < remainder { base_amount + 1 } else { base_amount };
                Money::from_minor(minor, self.currency)
            })
            .collect())
    }

    /// Allocates money according to given ratios, in minor units.
    ///
    /// Each part gets the floor of its exact share; leftover minor units go
    /// to the parts with the largest fractional remainder (earlier parts win
    /// ties). The parts always sum to the original and are never negative.
    pub fn allocate_by_ratios(&self, ratios: &[Decimal]) -> Result<Vec<Money>, MoneyError> {
        if ratios.is_empty() {
            return Err(MoneyError::InvalidAmount("Empty ratios".to_string()));
        }
        if ratios.iter().any(|r| *r < Decimal::ZERO) {
            return Err(MoneyError::InvalidAmount("Ratios must not be negative".to_string()));
        }
        let total_ratio: Decimal = ratios.iter().sum();
        if total_ratio.is_zero() {
            return Err(MoneyError::InvalidAmount("Total ratio is zero".to_string()));
        }
        if self.is_negative() {
            return Err(MoneyError::InvalidAmount(format!(
                "Cannot allocate negative amount {}",
                self
            )));
        }

        let total_minor = self.to_minor()?;
        let mut parts = Vec::with_capacity(ratios.len());
        let mut fractions = Vec::with_capacity(ratios.len());
        let mut assigned = 0i64;

        for (i, ratio) in ratios.iter().enumerate() {
            let exact = Decimal::from(total_minor)
                .checked_mul(*ratio)
                .and_then(|v| v.checked_div(total_ratio))
                .ok_or(MoneyError::Overflow)?;
            let floor = exact.floor();
            let minor = floor.to_i64().ok_or(MoneyError::Overflow)?;
            assigned += minor;
            parts.push(minor);
            fractions.push((exact - floor, i));
        }

        fractions.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let leftover = usize::try_from(total_minor - assigned).map_err(|_| MoneyError::Overflow)?;
        for (_, i) in fractions.into_iter().take(leftover) {
            parts[i] += 1;
        }

        Ok(parts
            .into_iter()
            .map(|minor| Money::from_minor(minor, self.currency))
            .collect())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{:.dp$} {}",
            self.amount,
            self.currency.code(),
            dp = dp as usize
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}
