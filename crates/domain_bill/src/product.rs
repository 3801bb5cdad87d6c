//! Products and the rest-of-products bucket

use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::payer::Payer;

/// Where a product's price comes from
///
/// Only the first commit looks at the origin. After that every product is
/// `Committed` and price edits move the bill total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrigin {
    /// Added on top of the total
    New,
    /// Carved out of the rest-of-products bucket
    SplitFromRest,
    /// Price confirmed at least once
    Committed,
}

/// A priced line item on a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub quantity: u32,
    total_price: Money,
    staged_price: Option<Money>,
    payers: Vec<Payer>,
    origin: ProductOrigin,
}

impl Product {
    pub(crate) fn pending(origin: ProductOrigin, zero: Money, payers: Vec<Payer>) -> Self {
        Self {
            name: String::new(),
            quantity: 0,
            total_price: zero,
            staged_price: None,
            payers,
            origin,
        }
    }

    /// Last committed price
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Price entered but not yet committed
    pub fn staged_price(&self) -> Option<Money> {
        self.staged_price
    }

    /// The price a commit would apply: the staged one, else the committed one
    pub fn pending_price(&self) -> Money {
        self.staged_price.unwrap_or(self.total_price)
    }

    pub fn payers(&self) -> &[Payer] {
        &self.payers
    }

    pub fn origin(&self) -> ProductOrigin {
        self.origin
    }

    pub fn is_new(&self) -> bool {
        self.origin == ProductOrigin::New
    }

    pub fn is_split_from_rest(&self) -> bool {
        self.origin == ProductOrigin::SplitFromRest
    }

    pub fn is_committed(&self) -> bool {
        self.origin == ProductOrigin::Committed
    }

    pub(crate) fn stage(&mut self, price: Money) {
        self.staged_price = Some(price);
    }

    pub(crate) fn discard_staged(&mut self) {
        self.staged_price = None;
    }

    pub(crate) fn commit(&mut self, price: Money) {
        self.total_price = price;
        self.staged_price = None;
        self.origin = ProductOrigin::Committed;
    }

    pub(crate) fn set_payers(&mut self, payers: Vec<Payer>) {
        self.payers = payers;
    }
}

/// The unitemized remainder of a bill's total
///
/// Exactly one per bill. It has no payer list of its own; the bill-level
/// initial payers carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestOfProducts {
    price: Money,
}

impl RestOfProducts {
    pub(crate) fn new(price: Money) -> Self {
        Self { price }
    }

    pub fn price(&self) -> Money {
        self.price
    }
}

/// What happens to a committed product's price when it is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalDisposition {
    /// The price leaves the bill; the total shrinks
    DeleteFromBill,
    /// The price folds back into the rest bucket; the total is unchanged
    ReturnToRest,
}
