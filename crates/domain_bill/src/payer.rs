//! Payer assignments
//!
//! A payer ties a roster member to a price being divided: either a single
//! product or the bill as a whole. Members can sit out, take an even share of
//! whatever is left, or pay a fixed amount.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use core_kernel::{Currency, MemberId, Money};

use crate::error::BillError;
use crate::member::Roster;

/// How a member participates in a price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Share {
    /// Not paying for this item
    Unassigned,
    /// Splits whatever the fixed payers leave, evenly
    Even,
    /// Pays exactly this amount
    Fixed(Money),
}

/// A member's participation in a bill or a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    pub member_id: MemberId,
    share: Share,
}

impl Payer {
    pub fn unassigned(member_id: MemberId) -> Self {
        Self {
            member_id,
            share: Share::Unassigned,
        }
    }

    pub fn even(member_id: MemberId) -> Self {
        Self {
            member_id,
            share: Share::Even,
        }
    }

    /// Creates a payer with a fixed amount, which must be strictly positive
    pub fn fixed(member_id: MemberId, amount: Money) -> Result<Self, BillError> {
        check_fixed_amount(member_id, amount)?;
        Ok(Self {
            member_id,
            share: Share::Fixed(amount),
        })
    }

    pub fn share(&self) -> Share {
        self.share
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self.share, Share::Unassigned)
    }

    pub fn fixed_amount(&self) -> Option<Money> {
        match self.share {
            Share::Fixed(amount) => Some(amount),
            _ => None,
        }
    }

    /// Toggles participation. Un-assigning drops any fixed amount; assigning
    /// an unassigned payer gives them an even share.
    pub fn set_assigned(&mut self, assigned: bool) {
        self.share = match (assigned, self.share) {
            (false, _) => Share::Unassigned,
            (true, Share::Unassigned) => Share::Even,
            (true, share) => share,
        };
    }
}

fn check_fixed_amount(member_id: MemberId, amount: Money) -> Result<(), BillError> {
    if !amount.is_positive() {
        return Err(BillError::invalid_amount(format!(
            "fixed amount for {} must be positive, got {}",
            member_id, amount
        )));
    }
    if !amount.fits_currency_precision() {
        return Err(BillError::invalid_amount(format!(
            "fixed amount {} is more precise than its currency",
            amount
        )));
    }
    Ok(())
}

/// Sum of the fixed amounts among the given payers
pub fn fixed_total(payers: &[Payer], currency: Currency) -> Result<Money, BillError> {
    let fixed: Vec<Money> = payers.iter().filter_map(Payer::fixed_amount).collect();
    Ok(Money::sum(fixed.iter(), currency)?)
}

/// Validates a payer list against the roster and the price it divides
///
/// Checks, in order: every member is on the roster, no member is listed
/// twice, fixed amounts are positive and in `price`'s currency, and their
/// sum does not exceed `price`.
///
/// Payers built with [`Payer::fixed`] always pass the positivity check;
/// decoded ones may not.
pub fn validate_payers(payers: &[Payer], roster: &Roster, price: Money) -> Result<(), BillError> {
    let mut seen = HashSet::with_capacity(payers.len());
    for payer in payers {
        roster.require(&payer.member_id)?;
        if !seen.insert(payer.member_id) {
            return Err(BillError::DuplicatePayer(payer.member_id));
        }
        if let Some(amount) = payer.fixed_amount() {
            check_fixed_amount(payer.member_id, amount)?;
        }
    }

    ensure_fixed_within(payers, price)
}

/// Fails with `OverAllocated` when the fixed amounts exceed `price`
pub fn ensure_fixed_within(payers: &[Payer], price: Money) -> Result<(), BillError> {
    let allocated = fixed_total(payers, price.currency())?;
    if allocated.checked_cmp(&price)? == Ordering::Greater {
        return Err(BillError::OverAllocated {
            allocated: allocated.amount(),
            available: price.amount(),
        });
    }
    Ok(())
}
