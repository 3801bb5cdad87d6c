//! Bill domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{MemberId, MoneyError, PortError};

/// Errors raised by ledger operations
///
/// Every variant is a local validation failure: the bill is left exactly as
/// it was before the call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillError {
    /// A proposed amount is negative, too precise, or would make another field negative
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A Rest-funded product edit would drive the rest bucket negative
    #[error("Insufficient rest balance: rest={rest}, requested={requested}")]
    InsufficientRestBalance {
        rest: Decimal,
        requested: Decimal,
    },

    /// Fixed payer amounts exceed the price being divided
    #[error("Over-allocated: fixed amounts {allocated} exceed {available}")]
    OverAllocated {
        allocated: Decimal,
        available: Decimal,
    },

    /// Stored prices break `total == rest + products`
    #[error("Unbalanced bill: total={total}, rest={rest}, products={products}")]
    Unbalanced {
        total: Decimal,
        rest: Decimal,
        products: Decimal,
    },

    /// Another product is still uncommitted
    #[error("Product {0} has an uncommitted price; commit or cancel it first")]
    PendingEditExists(usize),

    /// A priced item has no payer left to carry (part of) its price
    #[error("No payers assigned to {0}")]
    NoPayersAssigned(String),

    /// Product index out of range
    #[error("Product not found at index {0}")]
    ProductNotFound(usize),

    /// The product was never committed, so it cannot be removed from the bill
    #[error("Product {0} is not committed; cancel it instead")]
    ProductNotCommitted(usize),

    /// The product is committed, so it cannot be cancelled
    #[error("Product {0} is already committed; remove it instead")]
    ProductAlreadyCommitted(usize),

    /// The bill reached its configured product limit
    #[error("Product limit of {0} reached")]
    ProductLimitReached(usize),

    /// A payer or contributor is not part of the bill roster
    #[error("Member {0} is not part of this bill")]
    UnknownMember(MemberId),

    /// The same member appears twice in a payer list
    #[error("Member {0} appears more than once")]
    DuplicatePayer(MemberId),

    /// Only the bill owner may edit the bill
    #[error("Member {0} is not the owner of this bill")]
    NotOwner(MemberId),

    /// Settlement contributions do not cover what is owed
    #[error("Contributions of {contributed} do not match the owed total {owed}")]
    ContributionMismatch {
        contributed: Decimal,
        owed: Decimal,
    },

    /// Field validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Money arithmetic failed (currency mismatch, overflow)
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl BillError {
    pub(crate) fn invalid_amount(message: impl Into<String>) -> Self {
        BillError::InvalidAmount(message.into())
    }
}

impl From<validator::ValidationErrors> for BillError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BillError::ValidationFailed(errors.to_string())
    }
}

/// Errors raised by [`crate::services::BillService`]
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Bill(#[from] BillError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl ServiceError {
    /// Returns the ledger error, if this is one
    pub fn as_bill_error(&self) -> Option<&BillError> {
        match self {
            ServiceError::Bill(e) => Some(e),
            ServiceError::Port(_) => None,
        }
    }
}
