//! Pre-built Test Fixtures
//!
//! Provides ready-to-use members and amounts for bill tests. Amounts are in
//! RON, the default bill currency.

use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, MemberId, Money};
use domain_bill::Member;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates a RON amount
    pub fn ron(amount: Decimal) -> Money {
        Money::new(amount, Currency::RON)
    }

    /// Creates a zero RON amount
    pub fn ron_zero() -> Money {
        Money::zero(Currency::RON)
    }

    /// The 100 RON total used by the standard itemizing scenario
    pub fn ron_100() -> Money {
        Money::new(dec!(100.00), Currency::RON)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// An amount with more decimals than RON allows
    pub fn ron_too_precise() -> Money {
        Money::new(dec!(1.005), Currency::RON)
    }
}

/// Fixture for group members
pub struct MemberFixtures;

impl MemberFixtures {
    /// A member with a generated display name and a username derived from `seq`
    pub fn member(seq: usize) -> Member {
        let name: String = Name().fake();
        let display_name: String = name.chars().take(50).collect();
        Member::new(MemberId::new(), display_name, format!("member_{:04}", seq))
            .expect("fixture member is valid")
    }

    /// `n` distinct members
    pub fn members(n: usize) -> Vec<Member> {
        (0..n).map(Self::member).collect()
    }

    /// A member with a fixed name, for tests that print or compare names
    pub fn named(display_name: &str, username: &str) -> Member {
        Member::new(MemberId::new(), display_name, username).expect("fixture member is valid")
    }
}
