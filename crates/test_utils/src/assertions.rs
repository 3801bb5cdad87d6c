//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for bills and amounts that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_bill::{Bill, OwedAmounts};

/// Asserts that a bill's total equals its rest bucket plus its product prices
///
/// # Panics
///
/// Panics with the three figures if the sum does not hold or anything is negative
pub fn assert_ledger_balanced(bill: &Bill) {
    let products = bill.products_total().expect("product prices share the bill currency");
    let rest = bill.rest_of_products().price();
    let expected = products.checked_add(&rest).expect("rest shares the bill currency");

    assert_eq!(
        bill.total_price(),
        expected,
        "Ledger out of balance: total={}, rest={}, products={}",
        bill.total_price(),
        rest,
        products
    );
    assert!(!bill.total_price().is_negative(), "Negative total: {}", bill.total_price());
    assert!(!rest.is_negative(), "Negative rest: {}", rest);
    for (index, product) in bill.products().iter().enumerate() {
        assert!(
            !product.total_price().is_negative(),
            "Product {} has negative price {}",
            index,
            product.total_price()
        );
    }
}

/// Asserts that at most one product is uncommitted
pub fn assert_single_pending_product(bill: &Bill) {
    let pending = bill.products().iter().filter(|p| !p.is_committed()).count();
    assert!(pending <= 1, "Expected at most one uncommitted product, found {}", pending);
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = Money::sum(parts.iter(), total.currency()).expect("Currency mismatch in sum");

    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum,
        total
    );
}

/// Asserts that the owed amounts add up to the bill's committed total
pub fn assert_owed_covers_bill(owed: &OwedAmounts, bill: &Bill) {
    let owed_total = owed.total().expect("owed amounts share the bill currency");
    assert_eq!(
        owed_total,
        bill.total_price(),
        "Members owe {} but the bill totals {}",
        owed_total,
        bill.total_price()
    );
}
