//! Bill aggregate root
//!
//! The Bill is the consistency boundary for price allocation. It owns the
//! product list, the rest-of-products bucket, the running total and the
//! payer assignments, and exposes one method per user edit.
//!
//! # Invariants
//!
//! After every successful call:
//!
//! - `total_price == rest_of_products.price + sum(product.total_price)`
//! - the total, the rest price and every product price are non-negative
//! - every payer list references roster members once, and its fixed amounts
//!   do not exceed the price it divides (the rest bucket for initial payers)
//! - at most one product is uncommitted
//!
//! Every operation validates before it mutates, so a failed call leaves the
//! bill exactly as it was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use validator::Validate;

use core_kernel::{BillId, Currency, GroupId, MemberId, Money};

use crate::allocation::{self, OwedAmounts};
use crate::error::BillError;
use crate::member::{Member, Roster};
use crate::payer::{self, Payer};
use crate::product::{Product, ProductOrigin, RemovalDisposition, RestOfProducts};

/// Products allowed on a bill unless configured otherwise
pub const DEFAULT_PRODUCT_LIMIT: usize = 50;

/// Descriptive fields of a bill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BillDetails {
    #[validate(length(min = 1, max = 50))]
    pub title: String,
    #[validate(length(max = 100))]
    pub description: String,
}

impl BillDetails {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A shared expense split among group members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    id: BillId,
    group_id: Option<GroupId>,
    details: BillDetails,
    owner: Member,
    currency: Currency,
    total_price: Money,
    initial_payers: Vec<Payer>,
    products: Vec<Product>,
    rest_of_products: RestOfProducts,
    roster: Roster,
    product_limit: usize,
    created_at: DateTime<Utc>,
}

impl Bill {
    /// Creates an empty bill owned by `creator`
    ///
    /// The creator joins the roster if the supplied members do not include
    /// them. Initial payers default to the creator alone.
    pub fn initialize(
        members: impl IntoIterator<Item = Member>,
        creator: Member,
        currency: Currency,
    ) -> Self {
        let mut roster = Roster::new(members);
        roster.insert(creator.clone());

        let initial_payers = roster
            .iter()
            .map(|m| {
                if m.id == creator.id {
                    Payer::even(m.id)
                } else {
                    Payer::unassigned(m.id)
                }
            })
            .collect();

        Self {
            id: BillId::new_v7(),
            group_id: None,
            details: BillDetails::default(),
            owner: creator,
            currency,
            total_price: Money::zero(currency),
            initial_payers,
            products: Vec::new(),
            rest_of_products: RestOfProducts::new(Money::zero(currency)),
            roster,
            product_limit: DEFAULT_PRODUCT_LIMIT,
            created_at: Utc::now(),
        }
    }

    /// Attaches the bill to a group
    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Overrides the maximum number of products
    pub fn with_product_limit(mut self, limit: usize) -> Self {
        self.product_limit = limit;
        self
    }

    pub fn id(&self) -> BillId {
        self.id
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub fn details(&self) -> &BillDetails {
        &self.details
    }

    pub fn owner(&self) -> &Member {
        &self.owner
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn rest_of_products(&self) -> RestOfProducts {
        self.rest_of_products
    }

    pub fn initial_payers(&self) -> &[Payer] {
        &self.initial_payers
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, index: usize) -> Result<&Product, BillError> {
        self.products.get(index).ok_or(BillError::ProductNotFound(index))
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Index of the uncommitted product, if any
    pub fn pending_product(&self) -> Option<usize> {
        self.products.iter().position(|p| !p.is_committed())
    }

    /// Sum of committed product prices
    pub fn products_total(&self) -> Result<Money, BillError> {
        let prices: Vec<Money> = self.products.iter().map(Product::total_price).collect();
        Ok(Money::sum(prices.iter(), self.currency)?)
    }

    /// Every roster member with an even share
    pub fn default_payers(&self) -> Vec<Payer> {
        self.roster.ids().map(Payer::even).collect()
    }

    /// Returns true if the sum invariant holds and nothing is negative
    pub fn is_balanced(&self) -> bool {
        let Ok(products) = self.products_total() else {
            return false;
        };
        let Ok(expected) = products.checked_add(&self.rest_of_products.price()) else {
            return false;
        };
        expected == self.total_price
            && !self.total_price.is_negative()
            && !self.rest_of_products.price().is_negative()
            && self.products.iter().all(|p| !p.total_price().is_negative())
    }

    /// Fails with `NotOwner` for anyone but the bill owner
    pub fn ensure_owner(&self, member_id: &MemberId) -> Result<(), BillError> {
        if &self.owner.id != member_id {
            return Err(BillError::NotOwner(*member_id));
        }
        Ok(())
    }

    /// Replaces the title and description
    pub fn set_details(&mut self, details: BillDetails) -> Result<(), BillError> {
        details.validate()?;
        self.details = details;
        Ok(())
    }

    /// Sets the bill total; the difference goes to the rest bucket
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the total is negative or below the sum of products
    /// - `OverAllocated` if the initial payers' fixed amounts exceed the new rest
    pub fn set_total_price(&mut self, new_total: Money) -> Result<(), BillError> {
        self.check_amount(new_total, "total price")?;

        let products = self.products_total()?;
        if new_total.checked_cmp(&products)? == Ordering::Less {
            return Err(BillError::invalid_amount(format!(
                "total {} is below the products sum {}",
                new_total, products
            )));
        }

        let delta = new_total.checked_sub(&self.total_price)?;
        let new_rest = self.rest_of_products.price().checked_add(&delta)?;
        payer::ensure_fixed_within(&self.initial_payers, new_rest)?;

        self.total_price = new_total;
        self.rest_of_products = RestOfProducts::new(new_rest);
        debug_assert!(self.is_balanced());
        Ok(())
    }

    /// Sets the rest bucket; the difference moves the total
    pub fn set_rest_of_products_price(&mut self, new_rest: Money) -> Result<(), BillError> {
        self.check_amount(new_rest, "rest of products price")?;

        payer::ensure_fixed_within(&self.initial_payers, new_rest)?;

        let delta = new_rest.checked_sub(&self.rest_of_products.price())?;
        let new_total = self.total_price.checked_add(&delta)?;

        self.total_price = new_total;
        self.rest_of_products = RestOfProducts::new(new_rest);
        debug_assert!(self.is_balanced());
        Ok(())
    }

    /// Appends a zero-priced product whose price will be added on top of the total
    pub fn add_new_product(&mut self, default_payers: Vec<Payer>) -> Result<usize, BillError> {
        self.start_product(ProductOrigin::New, default_payers)
    }

    /// Appends a zero-priced product whose price will be carved out of the rest bucket
    pub fn split_product_from_rest(
        &mut self,
        default_payers: Vec<Payer>,
    ) -> Result<usize, BillError> {
        self.start_product(ProductOrigin::SplitFromRest, default_payers)
    }

    fn start_product(
        &mut self,
        origin: ProductOrigin,
        payers: Vec<Payer>,
    ) -> Result<usize, BillError> {
        if let Some(pending) = self.pending_product() {
            return Err(BillError::PendingEditExists(pending));
        }
        if self.products.len() >= self.product_limit {
            return Err(BillError::ProductLimitReached(self.product_limit));
        }
        let zero = Money::zero(self.currency);
        payer::validate_payers(&payers, &self.roster, zero)?;

        self.products.push(Product::pending(origin, zero, payers));
        Ok(self.products.len() - 1)
    }

    /// Stages a price edit; nothing moves until [`Bill::commit_product_price`]
    pub fn set_product_price(&mut self, index: usize, new_price: Money) -> Result<(), BillError> {
        self.product(index)?;
        self.check_amount(new_price, "product price")?;
        self.products[index].stage(new_price);
        Ok(())
    }

    /// Applies the staged price of a product
    ///
    /// A product split from the rest bucket takes its first price from the
    /// rest; every other commit moves the total. Either way the product is
    /// committed afterwards and later edits move the total.
    ///
    /// # Errors
    ///
    /// - `InsufficientRestBalance` if a split product asks for more than the rest holds
    /// - `OverAllocated` if the product's fixed payers would exceed the new
    ///   price, or the initial payers' would exceed what is left in the rest
    pub fn commit_product_price(&mut self, index: usize) -> Result<(), BillError> {
        let product = self.product(index)?;
        let price = product.pending_price();
        let diff = price.checked_sub(&product.total_price())?;
        payer::ensure_fixed_within(product.payers(), price)?;

        let (new_total, new_rest) = match product.origin() {
            ProductOrigin::SplitFromRest => {
                let rest = self.rest_of_products.price();
                let new_rest = rest.checked_sub(&diff)?;
                if new_rest.is_negative() {
                    return Err(BillError::InsufficientRestBalance {
                        rest: rest.amount(),
                        requested: diff.amount(),
                    });
                }
                payer::ensure_fixed_within(&self.initial_payers, new_rest)?;
                (self.total_price, new_rest)
            }
            ProductOrigin::New | ProductOrigin::Committed => {
                let new_total = self.total_price.checked_add(&diff)?;
                if new_total.is_negative() {
                    return Err(BillError::invalid_amount(format!(
                        "total would become {}",
                        new_total
                    )));
                }
                (new_total, self.rest_of_products.price())
            }
        };

        self.total_price = new_total;
        self.rest_of_products = RestOfProducts::new(new_rest);
        self.products[index].commit(price);
        debug_assert!(self.is_balanced());
        Ok(())
    }

    /// Drops a staged price edit
    pub fn discard_product_price_edit(&mut self, index: usize) -> Result<(), BillError> {
        self.product(index)?;
        self.products[index].discard_staged();
        Ok(())
    }

    /// Removes a committed product
    ///
    /// Uncommitted products never touched the total or the rest bucket and
    /// are removed with [`Bill::cancel_pending_product`] instead.
    pub fn remove_product(
        &mut self,
        index: usize,
        disposition: RemovalDisposition,
    ) -> Result<Product, BillError> {
        let product = self.product(index)?;
        if !product.is_committed() {
            return Err(BillError::ProductNotCommitted(index));
        }
        let price = product.total_price();

        match disposition {
            RemovalDisposition::DeleteFromBill => {
                self.total_price = self.total_price.checked_sub(&price)?;
            }
            RemovalDisposition::ReturnToRest => {
                let new_rest = self.rest_of_products.price().checked_add(&price)?;
                self.rest_of_products = RestOfProducts::new(new_rest);
            }
        }

        let removed = self.products.remove(index);
        debug_assert!(self.is_balanced());
        Ok(removed)
    }

    /// Removes the uncommitted product without touching the total or the rest bucket
    pub fn cancel_pending_product(&mut self, index: usize) -> Result<Product, BillError> {
        if self.product(index)?.is_committed() {
            return Err(BillError::ProductAlreadyCommitted(index));
        }
        Ok(self.products.remove(index))
    }

    /// Renames a product or changes its quantity
    pub fn set_product_details(
        &mut self,
        index: usize,
        name: impl Into<String>,
        quantity: u32,
    ) -> Result<(), BillError> {
        self.product(index)?;
        let product = &mut self.products[index];
        product.name = name.into();
        product.quantity = quantity;
        Ok(())
    }

    /// Replaces who pays for a product
    pub fn set_product_payers(
        &mut self,
        index: usize,
        payers: Vec<Payer>,
    ) -> Result<(), BillError> {
        let price = self.product(index)?.total_price();
        payer::validate_payers(&payers, &self.roster, price)?;
        self.products[index].set_payers(payers);
        Ok(())
    }

    /// Replaces the bill-level payers
    ///
    /// Their fixed amounts are bounded by the rest bucket they divide, which
    /// never exceeds the total.
    pub fn set_initial_payers(&mut self, payers: Vec<Payer>) -> Result<(), BillError> {
        payer::validate_payers(&payers, &self.roster, self.rest_of_products.price())?;
        self.initial_payers = payers;
        Ok(())
    }

    /// Amount each roster member owes
    pub fn compute_owed(&self) -> Result<OwedAmounts, BillError> {
        allocation::compute_owed(self)
    }

    /// Re-checks every ledger invariant
    ///
    /// Edits keep these by construction. A bill decoded from storage skipped
    /// the edit methods, so repositories run this before handing it out.
    pub fn check_integrity(&self) -> Result<(), BillError> {
        for member in self.roster.iter() {
            member.validate()?;
        }
        self.roster.require(&self.owner.id)?;
        self.check_amount(self.total_price, "total price")?;
        let rest = self.rest_of_products.price();
        self.check_amount(rest, "rest of products price")?;

        for (index, product) in self.products.iter().enumerate() {
            self.check_amount(product.total_price(), "product price")?;
            if let Some(staged) = product.staged_price() {
                self.check_amount(staged, "staged product price")?;
            }
            if !product.is_committed() && !product.total_price().is_zero() {
                return Err(BillError::invalid_amount(format!(
                    "uncommitted product {} carries a price of {}",
                    index,
                    product.total_price()
                )));
            }
            payer::validate_payers(product.payers(), &self.roster, product.total_price())?;
        }
        payer::validate_payers(&self.initial_payers, &self.roster, rest)?;

        let products = self.products_total()?;
        if products.checked_add(&rest)? != self.total_price {
            return Err(BillError::Unbalanced {
                total: self.total_price.amount(),
                rest: rest.amount(),
                products: products.amount(),
            });
        }

        let mut pending = self.products.iter().enumerate().filter(|(_, p)| !p.is_committed());
        if let (Some(_), Some((second, _))) = (pending.next(), pending.next()) {
            return Err(BillError::PendingEditExists(second));
        }
        if self.products.len() > self.product_limit {
            return Err(BillError::ProductLimitReached(self.product_limit));
        }
        Ok(())
    }

    fn check_amount(&self, amount: Money, field: &str) -> Result<(), BillError> {
        amount.ensure_currency(self.currency)?;
        if amount.is_negative() {
            return Err(BillError::invalid_amount(format!(
                "{} cannot be negative, got {}",
                field, amount
            )));
        }
        if !amount.fits_currency_precision() {
            return Err(BillError::invalid_amount(format!(
                "{} {} has more decimals than {} allows",
                field, amount, self.currency
            )));
        }
        Ok(())
    }
}
