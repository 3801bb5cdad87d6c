//! Owed-amount allocation
//!
//! Turns a bill into what each member owes. Every committed product is split
//! among its payers and the rest bucket among the bill's initial payers.
//! Within one item, fixed payers owe exactly their amount and the remainder
//! is divided evenly, in minor units, across the other assigned payers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, MemberId, Money};

use crate::bill::Bill;
use crate::error::BillError;
use crate::payer::{self, Payer, Share};

/// Per-member amounts owed for a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwedAmounts {
    currency: Currency,
    amounts: BTreeMap<MemberId, Money>,
}

impl OwedAmounts {
    /// Starts every listed member at zero
    pub fn new(currency: Currency, members: impl IntoIterator<Item = MemberId>) -> Self {
        let amounts = members
            .into_iter()
            .map(|id| (id, Money::zero(currency)))
            .collect();
        Self { currency, amounts }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// What `member_id` owes; zero for members not on the bill
    pub fn get(&self, member_id: &MemberId) -> Money {
        self.amounts
            .get(member_id)
            .copied()
            .unwrap_or_else(|| Money::zero(self.currency))
    }

    pub fn contains(&self, member_id: &MemberId) -> bool {
        self.amounts.contains_key(member_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &Money)> {
        self.amounts.iter()
    }

    pub fn total(&self) -> Result<Money, BillError> {
        Ok(Money::sum(self.amounts.values(), self.currency)?)
    }

    pub(crate) fn add(&mut self, member_id: MemberId, amount: Money) -> Result<(), BillError> {
        let entry = self
            .amounts
            .entry(member_id)
            .or_insert_with(|| Money::zero(amount.currency()));
        *entry = entry.checked_add(&amount)?;
        Ok(())
    }
}

/// Splits `price` among `payers`
///
/// Returns one share per assigned payer, in payer order. `item` names the
/// priced thing in errors.
///
/// # Errors
///
/// - `OverAllocated` if fixed amounts exceed the price
/// - `NoPayersAssigned` if the price is positive and nobody is assigned, or
///   if fixed payers leave a remainder with no even payer to carry it
pub fn split_price(
    price: Money,
    payers: &[Payer],
    item: &str,
) -> Result<Vec<(MemberId, Money)>, BillError> {
    payer::ensure_fixed_within(payers, price)?;
    if price.is_zero() {
        return Ok(Vec::new());
    }

    let assigned: Vec<&Payer> = payers.iter().filter(|p| p.is_assigned()).collect();
    if assigned.is_empty() {
        return Err(BillError::NoPayersAssigned(item.to_string()));
    }

    let fixed = payer::fixed_total(payers, price.currency())?;
    let remaining = price.checked_sub(&fixed)?;
    let even_count = assigned.iter().filter(|p| p.share() == Share::Even).count();

    if even_count == 0 {
        if remaining.is_positive() {
            return Err(BillError::NoPayersAssigned(format!("the unfixed remainder of {}", item)));
        }
        return Ok(assigned
            .iter()
            .filter_map(|p| p.fixed_amount().map(|amount| (p.member_id, amount)))
            .collect());
    }

    let parts = u32::try_from(even_count)
        .map_err(|_| BillError::invalid_amount("too many payers"))?;
    let mut even_shares = remaining.allocate(parts)?.into_iter();

    let mut shares = Vec::with_capacity(assigned.len());
    for p in assigned {
        let amount = match p.share() {
            Share::Fixed(amount) => amount,
            Share::Even => even_shares
                .next()
                .ok_or_else(|| BillError::invalid_amount("even split produced too few shares"))?,
            Share::Unassigned => continue,
        };
        shares.push((p.member_id, amount));
    }
    Ok(shares)
}

/// Computes what every roster member owes for the bill
///
/// Uncommitted products have no committed price yet and contribute nothing.
pub fn compute_owed(bill: &Bill) -> Result<OwedAmounts, BillError> {
    let mut owed = OwedAmounts::new(bill.currency(), bill.roster().ids());

    for (index, product) in bill.products().iter().enumerate() {
        if !product.is_committed() {
            continue;
        }
        let label = if product.name.is_empty() {
            format!("product {}", index)
        } else {
            format!("product '{}'", product.name)
        };
        for (member_id, amount) in split_price(product.total_price(), product.payers(), &label)? {
            owed.add(member_id, amount)?;
        }
    }

    let rest = bill.rest_of_products().price();
    let rest_shares = split_price(rest, bill.initial_payers(), "the rest of the products")?;
    for (member_id, amount) in rest_shares {
        owed.add(member_id, amount)?;
    }

    Ok(owed)
}
