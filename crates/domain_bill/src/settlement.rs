//! Settlement planning
//!
//! Once a bill is final, someone has usually paid the merchant. This module
//! nets what each member contributed against what they owe and plans the
//! transfers that square everyone up. Each member still owing pays every
//! member who paid too much, in proportion to that member's share of the
//! total excess.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use core_kernel::{MemberId, Money, MoneyError};

use crate::allocation::OwedAmounts;
use crate::error::BillError;

/// Money a member paid towards the bill up front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub member_id: MemberId,
    pub amount: Money,
}

impl Contribution {
    pub fn new(member_id: MemberId, amount: Money) -> Self {
        Self { member_id, amount }
    }
}

/// A planned transfer between two members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// How transfer amounts are rounded to the currency's minor unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementRounding {
    /// Each debt is split so its transfers sum exactly to it
    #[default]
    Exact,
    /// Every transfer is rounded up; debtors may overpay by a minor unit per transfer
    RoundUp,
}

/// Plans the transfers that settle a bill
///
/// # Errors
///
/// - `InvalidAmount` for non-positive contributions or contributions in another currency
/// - `UnknownMember` for contributors who are not on the bill
/// - `ContributionMismatch` if contributions do not add up to the owed total
pub fn plan_settlement(
    owed: &OwedAmounts,
    contributions: &[Contribution],
    rounding: SettlementRounding,
) -> Result<Vec<Transfer>, BillError> {
    let currency = owed.currency();
    let mut paid: BTreeMap<MemberId, Money> = BTreeMap::new();

    for contribution in contributions {
        contribution.amount.ensure_currency(currency)?;
        if !contribution.amount.is_positive() || !contribution.amount.fits_currency_precision() {
            return Err(BillError::invalid_amount(format!(
                "contribution of {} by {} must be a positive amount in {}",
                contribution.amount, contribution.member_id, currency
            )));
        }
        if !owed.contains(&contribution.member_id) {
            return Err(BillError::UnknownMember(contribution.member_id));
        }
        let entry = paid
            .entry(contribution.member_id)
            .or_insert_with(|| Money::zero(currency));
        *entry = entry.checked_add(&contribution.amount)?;
    }

    let contributed = Money::sum(paid.values(), currency)?;
    let owed_total = owed.total()?;
    if contributed != owed_total {
        return Err(BillError::ContributionMismatch {
            contributed: contributed.amount(),
            owed: owed_total.amount(),
        });
    }

    let mut debtors = Vec::new();
    let mut creditors = Vec::new();
    for (member_id, owes) in owed.iter() {
        let net = paid
            .get(member_id)
            .copied()
            .unwrap_or_else(|| Money::zero(currency))
            .checked_sub(owes)?;
        if net.is_negative() {
            debtors.push((*member_id, net.abs()));
        } else if net.is_positive() {
            creditors.push((*member_id, net));
        }
    }

    if creditors.is_empty() {
        return Ok(Vec::new());
    }

    let excess = Money::sum(creditors.iter().map(|(_, m)| m), currency)?;
    let ratios: Vec<Decimal> = creditors.iter().map(|(_, m)| m.amount()).collect();

    let mut transfers = Vec::new();
    for (debtor, debt) in debtors {
        let parts = match rounding {
            SettlementRounding::Exact => debt.allocate_by_ratios(&ratios)?,
            SettlementRounding::RoundUp => ratios
                .iter()
                .map(|ratio| {
                    debt.amount()
                        .checked_mul(*ratio)
                        .and_then(|v| v.checked_div(excess.amount()))
                        .map(|share| Money::new(share, currency).round_up_to_currency())
                        .ok_or(MoneyError::Overflow)
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        for ((creditor, _), amount) in creditors.iter().zip(parts) {
            if amount.is_positive() {
                transfers.push(Transfer {
                    from: debtor,
                    to: *creditor,
                    amount,
                });
            }
        }
    }

    debug!(
        transfers = transfers.len(),
        creditors = creditors.len(),
        ?rounding,
        "Planned settlement"
    );
    Ok(transfers)
}
