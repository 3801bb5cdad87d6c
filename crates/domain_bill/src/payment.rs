//! Payments between members
//!
//! A settled bill produces one payment per planned transfer. Deleting a bill
//! does not erase money that already moved: every completed payment gets a
//! compensating payment in the opposite direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, MemberId, Money, PaymentId};

use crate::settlement::Transfer;

/// How the payer intends to pay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Not chosen yet
    #[default]
    NotSelected,
    /// Cash handed over in person
    Cash,
    /// Revolut transfer
    Revolut,
}

/// Payment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// A payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Bill the payment settles; `None` once the bill is gone
    pub bill_id: Option<BillId>,
    /// Member sending the money
    pub payer_id: MemberId,
    /// Member receiving the money
    pub recipient_id: MemberId,
    /// Payment amount
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// Status
    pub status: PaymentStatus,
    /// When the payment was created
    pub date: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment that has not been started
    pub fn new(
        bill_id: Option<BillId>,
        payer_id: MemberId,
        recipient_id: MemberId,
        amount: Money,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            bill_id,
            payer_id,
            recipient_id,
            amount,
            method: PaymentMethod::NotSelected,
            status: PaymentStatus::NotStarted,
            date: Utc::now(),
        }
    }

    /// Creates the payment for a planned settlement transfer
    pub fn from_transfer(bill_id: BillId, transfer: &Transfer) -> Self {
        Self::new(Some(bill_id), transfer.from, transfer.to, transfer.amount)
    }

    /// Sets the payment method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Marks the payment as in progress
    pub fn start(&mut self) {
        self.status = PaymentStatus::InProgress;
    }

    /// Marks the payment as completed
    pub fn complete(&mut self) {
        self.status = PaymentStatus::Completed;
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Builds the payment that undoes this one
    ///
    /// The reversal flows from the original recipient back to the original
    /// payer, belongs to no bill, and starts over as not started with no
    /// method selected.
    pub fn reversal(&self) -> Self {
        Self::new(None, self.recipient_id, self.payer_id, self.amount)
    }
}

/// Reversals for every completed payment in `payments`
///
/// Payments that never completed moved no money and are simply dropped.
pub fn reverse_completed(payments: &[Payment]) -> Vec<Payment> {
    payments
        .iter()
        .filter(|p| p.is_completed())
        .map(Payment::reversal)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn payment() -> Payment {
        Payment::new(
            Some(BillId::new()),
            MemberId::new(),
            MemberId::new(),
            Money::new(dec!(25), Currency::RON),
        )
    }

    #[test]
    fn test_new_payment_not_started() {
        let p = payment();
        assert_eq!(p.status, PaymentStatus::NotStarted);
        assert_eq!(p.method, PaymentMethod::NotSelected);
        assert!(!p.is_completed());
    }

    #[test]
    fn test_status_progression() {
        let mut p = payment().with_method(PaymentMethod::Revolut);
        p.start();
        assert_eq!(p.status, PaymentStatus::InProgress);
        p.complete();
        assert!(p.is_completed());
        assert_eq!(p.method, PaymentMethod::Revolut);
    }

    #[test]
    fn test_reversal_swaps_direction() {
        let mut p = payment().with_method(PaymentMethod::Cash);
        p.complete();

        let r = p.reversal();
        assert_ne!(r.id, p.id);
        assert_eq!(r.bill_id, None);
        assert_eq!(r.payer_id, p.recipient_id);
        assert_eq!(r.recipient_id, p.payer_id);
        assert_eq!(r.amount, p.amount);
        assert_eq!(r.status, PaymentStatus::NotStarted);
        assert_eq!(r.method, PaymentMethod::NotSelected);
    }

    #[test]
    fn test_only_completed_payments_are_reversed() {
        let mut done = payment();
        done.complete();
        let mut started = payment();
        started.start();

        let reversals = reverse_completed(&[done.clone(), started, payment()]);
        assert_eq!(reversals.len(), 1);
        assert_eq!(reversals[0].payer_id, done.recipient_id);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::NotSelected).unwrap(),
            "\"NOT_SELECTED\""
        );
    }
}
