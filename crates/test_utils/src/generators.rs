//! Property-Based Test Generators
//!
//! Provides proptest strategies for amounts and for random sequences of
//! ledger edits. Edits are generated blind: indices may point past the end
//! of the product list and prices may be negative, so a sequence exercises
//! the failure paths as well as the happy ones.

use proptest::prelude::*;

use core_kernel::{Currency, Money};
use domain_bill::{Bill, BillError, Payer, RemovalDisposition};

/// Strategy for non-negative RON amounts up to 1000.00
pub fn ron_amount_strategy() -> impl Strategy<Value = Money> {
    (0i64..=100_000i64).prop_map(|minor| Money::from_minor(minor, Currency::RON))
}

/// Strategy for RON amounts that are sometimes negative
pub fn ron_edit_strategy() -> impl Strategy<Value = Money> {
    prop_oneof![
        9 => ron_amount_strategy(),
        1 => (-5_000i64..0i64).prop_map(|minor| Money::from_minor(minor, Currency::RON)),
    ]
}

/// How one roster member takes part in a generated payer list
#[derive(Debug, Clone, Copy)]
pub enum PayerSpec {
    Unassigned,
    Even,
    Fixed(i64),
}

fn payer_spec_strategy() -> impl Strategy<Value = PayerSpec> {
    prop_oneof![
        1 => Just(PayerSpec::Unassigned),
        3 => Just(PayerSpec::Even),
        1 => (1i64..20_000i64).prop_map(PayerSpec::Fixed),
    ]
}

/// A single ledger edit
#[derive(Debug, Clone)]
pub enum LedgerOp {
    SetTotal(Money),
    SetRest(Money),
    AddNewProduct,
    SplitFromRest,
    SetProductPrice(usize, Money),
    CommitProductPrice(usize),
    DiscardProductPriceEdit(usize),
    RemoveProduct(usize, RemovalDisposition),
    CancelPendingProduct(usize),
    SetProductPayers(usize, Vec<PayerSpec>),
    SetInitialPayers(Vec<PayerSpec>),
}

/// Strategy for one ledger edit
pub fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    let index = 0usize..6usize;
    let disposition = prop_oneof![
        Just(RemovalDisposition::DeleteFromBill),
        Just(RemovalDisposition::ReturnToRest),
    ];
    let payers = || proptest::collection::vec(payer_spec_strategy(), 0..5);

    prop_oneof![
        1 => ron_edit_strategy().prop_map(LedgerOp::SetTotal),
        1 => ron_edit_strategy().prop_map(LedgerOp::SetRest),
        2 => Just(LedgerOp::AddNewProduct),
        2 => Just(LedgerOp::SplitFromRest),
        3 => (index.clone(), ron_edit_strategy())
            .prop_map(|(i, m)| LedgerOp::SetProductPrice(i, m)),
        3 => index.clone().prop_map(LedgerOp::CommitProductPrice),
        1 => index.clone().prop_map(LedgerOp::DiscardProductPriceEdit),
        1 => (index.clone(), disposition).prop_map(|(i, d)| LedgerOp::RemoveProduct(i, d)),
        1 => index.clone().prop_map(LedgerOp::CancelPendingProduct),
        1 => (index, payers()).prop_map(|(i, p)| LedgerOp::SetProductPayers(i, p)),
        1 => payers().prop_map(LedgerOp::SetInitialPayers),
    ]
}

/// Strategy for a sequence of ledger edits
pub fn ledger_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    proptest::collection::vec(ledger_op_strategy(), 1..max_len)
}

/// Resolves payer specs against the bill's roster, in roster order
///
/// Specs beyond the roster size are ignored. Invalid fixed amounts fail
/// the same way [`Payer::fixed`] does.
pub fn resolve_payers(bill: &Bill, specs: &[PayerSpec]) -> Result<Vec<Payer>, BillError> {
    bill.roster()
        .ids()
        .zip(specs)
        .map(|(id, spec)| match spec {
            PayerSpec::Unassigned => Ok(Payer::unassigned(id)),
            PayerSpec::Even => Ok(Payer::even(id)),
            PayerSpec::Fixed(minor) => Payer::fixed(id, Money::from_minor(*minor, bill.currency())),
        })
        .collect()
}

/// Applies one edit to a bill
pub fn apply_op(bill: &mut Bill, op: &LedgerOp) -> Result<(), BillError> {
    match op {
        LedgerOp::SetTotal(total) => bill.set_total_price(*total),
        LedgerOp::SetRest(rest) => bill.set_rest_of_products_price(*rest),
        LedgerOp::AddNewProduct => bill.add_new_product(bill.default_payers()).map(|_| ()),
        LedgerOp::SplitFromRest => bill.split_product_from_rest(bill.default_payers()).map(|_| ()),
        LedgerOp::SetProductPrice(i, price) => bill.set_product_price(*i, *price),
        LedgerOp::CommitProductPrice(i) => bill.commit_product_price(*i),
        LedgerOp::DiscardProductPriceEdit(i) => bill.discard_product_price_edit(*i),
        LedgerOp::RemoveProduct(i, disposition) => {
            bill.remove_product(*i, *disposition).map(|_| ())
        }
        LedgerOp::CancelPendingProduct(i) => bill.cancel_pending_product(*i).map(|_| ()),
        LedgerOp::SetProductPayers(i, specs) => {
            let payers = resolve_payers(bill, specs)?;
            bill.set_product_payers(*i, payers)
        }
        LedgerOp::SetInitialPayers(specs) => {
            let payers = resolve_payers(bill, specs)?;
            bill.set_initial_payers(payers)
        }
    }
}
