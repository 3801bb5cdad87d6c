//! Ledger behaviour tests for domain_bill

use rust_decimal_macros::dec;

use core_kernel::{Currency, MemberId, Money};
use domain_bill::{Bill, BillDetails, BillError, Payer, ProductOrigin, RemovalDisposition};
use test_utils::{assert_ledger_balanced, BillBuilder, MemberFixtures, MoneyFixtures};

fn ron(amount: rust_decimal::Decimal) -> Money {
    MoneyFixtures::ron(amount)
}

fn bill_with_total(total: Money) -> Bill {
    BillBuilder::new().with_total(total).build()
}

/// Owner pays `fixed` of the rest, everyone else splits what is left
fn with_owner_fixed(mut bill: Bill, fixed: Money) -> Bill {
    let owner = bill.owner().id;
    let payers = bill
        .roster()
        .ids()
        .map(|id| {
            if id == owner {
                Payer::fixed(id, fixed).unwrap()
            } else {
                Payer::even(id)
            }
        })
        .collect();
    bill.set_initial_payers(payers).unwrap();
    bill
}

// ============================================================================
// Total and rest
// ============================================================================

mod total_and_rest_tests {
    use super::*;

    #[test]
    fn test_new_bill_is_empty() {
        let bill = BillBuilder::new().build();

        assert!(bill.total_price().is_zero());
        assert!(bill.rest_of_products().price().is_zero());
        assert!(bill.products().is_empty());
        assert_eq!(bill.roster().len(), 3);
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_set_total_moves_rest() {
        let mut bill = BillBuilder::new().build();

        bill.set_total_price(ron(dec!(100))).unwrap();
        assert_eq!(bill.total_price(), ron(dec!(100)));
        assert_eq!(bill.rest_of_products().price(), ron(dec!(100)));

        bill.set_total_price(ron(dec!(80))).unwrap();
        assert_eq!(bill.rest_of_products().price(), ron(dec!(80)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_total_below_products_rejected() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(40)))
            .build();
        let before = bill.clone();

        assert!(matches!(
            bill.set_total_price(ron(dec!(39.99))),
            Err(BillError::InvalidAmount(_))
        ));
        assert_eq!(bill, before);

        bill.set_total_price(ron(dec!(40))).unwrap();
        assert!(bill.rest_of_products().price().is_zero());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut bill = bill_with_total(ron(dec!(10)));
        let before = bill.clone();

        assert!(matches!(
            bill.set_total_price(ron(dec!(-1))),
            Err(BillError::InvalidAmount(_))
        ));
        assert!(matches!(
            bill.set_rest_of_products_price(ron(dec!(-1))),
            Err(BillError::InvalidAmount(_))
        ));
        assert_eq!(bill, before);
    }

    #[test]
    fn test_set_rest_moves_total() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(30)))
            .build();

        bill.set_rest_of_products_price(ron(dec!(20))).unwrap();
        assert_eq!(bill.total_price(), ron(dec!(50)));
        assert_eq!(bill.products()[0].total_price(), ron(dec!(30)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_other_currency_rejected() {
        let mut bill = BillBuilder::new().build();
        assert!(matches!(
            bill.set_total_price(MoneyFixtures::eur_100()),
            Err(BillError::Money(_))
        ));
    }

    #[test]
    fn test_excess_precision_rejected() {
        let mut bill = BillBuilder::new().build();
        assert!(matches!(
            bill.set_total_price(MoneyFixtures::ron_too_precise()),
            Err(BillError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_digits_below_one_ban_rejected_everywhere() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(40)))
            .build();
        let before = bill.clone();
        let too_fine = Money::new(dec!(10.00004), Currency::RON);

        assert!(matches!(bill.set_total_price(too_fine), Err(BillError::InvalidAmount(_))));
        assert!(matches!(
            bill.set_rest_of_products_price(too_fine),
            Err(BillError::InvalidAmount(_))
        ));
        assert!(matches!(bill.set_product_price(0, too_fine), Err(BillError::InvalidAmount(_))));
        assert!(matches!(
            Payer::fixed(bill.owner().id, too_fine),
            Err(BillError::InvalidAmount(_))
        ));
        assert_eq!(bill, before);
        assert_eq!(bill.total_price(), ron(dec!(100)));
    }

    #[test]
    fn test_zero_decimal_currency() {
        let mut bill = BillBuilder::new().with_currency(Currency::JPY).build();
        bill.set_total_price(Money::new(dec!(1500), Currency::JPY)).unwrap();
        assert!(matches!(
            bill.set_total_price(Money::new(dec!(1500.5), Currency::JPY)),
            Err(BillError::InvalidAmount(_))
        ));
    }
}

// ============================================================================
// Product lifecycle
// ============================================================================

mod product_tests {
    use super::*;

    #[test]
    fn test_itemizing_scenario() {
        let mut bill = BillBuilder::new().build();
        bill.set_total_price(ron(dec!(100))).unwrap();

        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();
        assert_eq!(index, 0);
        bill.set_product_price(0, ron(dec!(40))).unwrap();
        bill.commit_product_price(0).unwrap();

        assert_eq!(bill.rest_of_products().price(), ron(dec!(60)));
        assert_eq!(bill.total_price(), ron(dec!(100)));
        assert_eq!(bill.products()[0].total_price(), ron(dec!(40)));

        // committed products are Total-funded from now on
        bill.set_product_price(0, ron(dec!(50))).unwrap();
        bill.commit_product_price(0).unwrap();

        assert_eq!(bill.rest_of_products().price(), ron(dec!(60)));
        assert_eq!(bill.total_price(), ron(dec!(110)));
        assert_eq!(bill.products()[0].total_price(), ron(dec!(50)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_new_product_grows_total() {
        let mut bill = bill_with_total(ron(dec!(100)));

        let index = bill.add_new_product(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(25))).unwrap();
        bill.commit_product_price(index).unwrap();

        assert_eq!(bill.total_price(), ron(dec!(125)));
        assert_eq!(bill.rest_of_products().price(), ron(dec!(100)));
        assert_eq!(bill.products()[index].total_price(), ron(dec!(25)));
        assert!(bill.products()[index].is_committed());
    }

    #[test]
    fn test_staged_price_moves_nothing() {
        let mut bill = bill_with_total(ron(dec!(100)));
        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();

        bill.set_product_price(index, ron(dec!(40))).unwrap();

        let product = &bill.products()[index];
        assert!(product.total_price().is_zero());
        assert_eq!(product.staged_price(), Some(ron(dec!(40))));
        assert_eq!(bill.rest_of_products().price(), ron(dec!(100)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_discard_restores_previous_state() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(40)))
            .build();
        let before = bill.clone();

        bill.set_product_price(0, ron(dec!(75))).unwrap();
        bill.discard_product_price_edit(0).unwrap();

        assert_eq!(bill, before);
    }

    #[test]
    fn test_split_beyond_rest_rejected() {
        let mut bill = bill_with_total(ron(dec!(30)));
        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(30.01))).unwrap();
        let before = bill.clone();

        assert_eq!(
            bill.commit_product_price(index),
            Err(BillError::InsufficientRestBalance {
                rest: dec!(30),
                requested: dec!(30.01),
            })
        );
        assert_eq!(bill, before);

        bill.set_product_price(index, ron(dec!(30))).unwrap();
        bill.commit_product_price(index).unwrap();
        assert!(bill.rest_of_products().price().is_zero());
    }

    #[test]
    fn test_only_one_pending_product() {
        let mut bill = bill_with_total(ron(dec!(100)));
        let index = bill.add_new_product(bill.default_payers()).unwrap();
        let before = bill.clone();

        assert_eq!(
            bill.split_product_from_rest(bill.default_payers()),
            Err(BillError::PendingEditExists(index))
        );
        assert_eq!(
            bill.add_new_product(bill.default_payers()),
            Err(BillError::PendingEditExists(index))
        );
        assert_eq!(bill, before);

        bill.commit_product_price(index).unwrap();
        assert!(bill.add_new_product(bill.default_payers()).is_ok());
    }

    #[test]
    fn test_commit_without_staged_price_commits_current() {
        let mut bill = bill_with_total(ron(dec!(100)));
        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();

        bill.commit_product_price(index).unwrap();

        assert!(bill.products()[index].is_committed());
        assert_eq!(bill.products()[index].origin(), ProductOrigin::Committed);
        assert_eq!(bill.rest_of_products().price(), ron(dec!(100)));
    }

    #[test]
    fn test_cancel_pending_product() {
        let mut bill = bill_with_total(ron(dec!(100)));
        let before = bill.clone();
        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(10))).unwrap();

        let cancelled = bill.cancel_pending_product(index).unwrap();
        assert_eq!(cancelled.staged_price(), Some(ron(dec!(10))));
        assert_eq!(bill, before);
    }

    #[test]
    fn test_cancel_committed_product_rejected() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(10)))
            .build();

        assert_eq!(
            bill.cancel_pending_product(0),
            Err(BillError::ProductAlreadyCommitted(0))
        );
    }

    #[test]
    fn test_unknown_product_index() {
        let mut bill = bill_with_total(ron(dec!(100)));
        assert_eq!(
            bill.set_product_price(3, ron(dec!(1))),
            Err(BillError::ProductNotFound(3))
        );
        assert_eq!(bill.commit_product_price(0), Err(BillError::ProductNotFound(0)));
    }

    #[test]
    fn test_product_limit() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_product_limit(2)
            .with_split_product(ron(dec!(10)))
            .with_split_product(ron(dec!(10)))
            .build();

        assert_eq!(
            bill.add_new_product(bill.default_payers()),
            Err(BillError::ProductLimitReached(2))
        );
    }

    #[test]
    fn test_product_details() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(10)))
            .build();

        bill.set_product_details(0, "Pizza", 2).unwrap();
        assert_eq!(bill.products()[0].name, "Pizza");
        assert_eq!(bill.products()[0].quantity, 2);
    }
}

// ============================================================================
// Removal
// ============================================================================

mod removal_tests {
    use super::*;

    fn bill_with_product() -> Bill {
        let mut bill = bill_with_total(ron(dec!(100)));
        let index = bill.add_new_product(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(20))).unwrap();
        bill.commit_product_price(index).unwrap();
        bill.set_total_price(ron(dec!(125))).unwrap();
        bill
    }

    #[test]
    fn test_delete_from_bill_shrinks_total() {
        let mut bill = bill_with_product();
        assert_eq!(bill.rest_of_products().price(), ron(dec!(105)));

        let removed = bill.remove_product(0, RemovalDisposition::DeleteFromBill).unwrap();

        assert_eq!(removed.total_price(), ron(dec!(20)));
        assert_eq!(bill.total_price(), ron(dec!(105)));
        assert_eq!(bill.rest_of_products().price(), ron(dec!(105)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_return_to_rest_keeps_total() {
        let mut bill = bill_with_product();

        bill.remove_product(0, RemovalDisposition::ReturnToRest).unwrap();

        assert_eq!(bill.total_price(), ron(dec!(125)));
        assert_eq!(bill.rest_of_products().price(), ron(dec!(125)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_return_to_rest_round_trip() {
        let original = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(40)))
            .build();
        let mut bill = original.clone();

        bill.remove_product(0, RemovalDisposition::ReturnToRest).unwrap();
        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(40))).unwrap();
        bill.commit_product_price(index).unwrap();

        assert_eq!(bill, original);
    }

    #[test]
    fn test_pending_product_cannot_be_removed() {
        let mut bill = bill_with_total(ron(dec!(100)));
        let index = bill.add_new_product(bill.default_payers()).unwrap();

        assert_eq!(
            bill.remove_product(index, RemovalDisposition::DeleteFromBill),
            Err(BillError::ProductNotCommitted(index))
        );
    }
}

// ============================================================================
// Payers and owed amounts
// ============================================================================

mod payer_tests {
    use super::*;

    #[test]
    fn test_even_split_of_product() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(30)))
            .with_split_product(ron(dec!(30)))
            .build();
        let ids: Vec<MemberId> = bill.roster().ids().collect();
        bill.set_product_payers(0, ids.iter().copied().map(Payer::even).collect())
            .unwrap();

        let owed = bill.compute_owed().unwrap();
        for id in &ids {
            assert_eq!(owed.get(id), ron(dec!(10)));
        }
    }

    #[test]
    fn test_fixed_payer_split() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(30)))
            .with_split_product(ron(dec!(30)))
            .build();
        let ids: Vec<MemberId> = bill.roster().ids().collect();
        bill.set_product_payers(
            0,
            vec![
                Payer::fixed(ids[0], ron(dec!(12))).unwrap(),
                Payer::even(ids[1]),
                Payer::even(ids[2]),
            ],
        )
        .unwrap();

        let owed = bill.compute_owed().unwrap();
        assert_eq!(owed.get(&ids[0]), ron(dec!(12)));
        assert_eq!(owed.get(&ids[1]), ron(dec!(9)));
        assert_eq!(owed.get(&ids[2]), ron(dec!(9)));
    }

    #[test]
    fn test_rest_goes_to_initial_payers() {
        let bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(40)))
            .build();
        let creator = bill.owner().id;
        let ids: Vec<MemberId> = bill.roster().ids().collect();

        // the product splits 40 three ways in roster order; the creator is
        // the only initial payer and carries the 60 left in the rest
        let product_shares = [ron(dec!(13.34)), ron(dec!(13.33)), ron(dec!(13.33))];
        let owed = bill.compute_owed().unwrap();
        for (id, share) in ids.iter().zip(product_shares) {
            let expected = if *id == creator {
                share.checked_add(&ron(dec!(60))).unwrap()
            } else {
                share
            };
            assert_eq!(owed.get(id), expected);
        }
        assert_eq!(owed.total().unwrap(), ron(dec!(100)));
    }

    #[test]
    fn test_payers_must_be_on_roster() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(30)))
            .with_split_product(ron(dec!(30)))
            .build();
        let stranger = MemberFixtures::member(99).id;

        assert_eq!(
            bill.set_product_payers(0, vec![Payer::even(stranger)]),
            Err(BillError::UnknownMember(stranger))
        );
    }

    #[test]
    fn test_fixed_amounts_bounded_by_price() {
        let mut bill = BillBuilder::new()
            .with_total(ron(dec!(30)))
            .with_split_product(ron(dec!(30)))
            .build();
        let ids: Vec<MemberId> = bill.roster().ids().collect();
        let payers = vec![Payer::fixed(ids[0], ron(dec!(25))).unwrap(), Payer::even(ids[1])];
        bill.set_product_payers(0, payers).unwrap();
        let before = bill.clone();

        bill.set_product_price(0, ron(dec!(20))).unwrap();
        assert_eq!(
            bill.commit_product_price(0),
            Err(BillError::OverAllocated {
                allocated: dec!(25),
                available: dec!(20),
            })
        );
        bill.discard_product_price_edit(0).unwrap();
        assert_eq!(bill, before);
    }

    #[test]
    fn test_initial_fixed_amount_bounded_by_rest_on_split_commit() {
        let mut bill = with_owner_fixed(bill_with_total(ron(dec!(100))), ron(dec!(50)));
        let owner = bill.owner().id;
        let index = bill.split_product_from_rest(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(60))).unwrap();
        let before = bill.clone();

        assert_eq!(
            bill.commit_product_price(index),
            Err(BillError::OverAllocated {
                allocated: dec!(50),
                available: dec!(40),
            })
        );
        assert_eq!(bill, before);
        assert_eq!(bill.compute_owed().unwrap().get(&owner), ron(dec!(50)));

        // carving exactly what the fixed payer leaves is fine
        bill.set_product_price(index, ron(dec!(50))).unwrap();
        bill.commit_product_price(index).unwrap();
        let owed = bill.compute_owed().unwrap();
        assert_eq!(owed.total().unwrap(), ron(dec!(100)));
        assert_ledger_balanced(&bill);
    }

    #[test]
    fn test_initial_fixed_amount_bounded_by_rest_on_total_edits() {
        let mut bill = with_owner_fixed(bill_with_total(ron(dec!(100))), ron(dec!(50)));
        let before = bill.clone();

        assert_eq!(
            bill.set_total_price(ron(dec!(40))),
            Err(BillError::OverAllocated {
                allocated: dec!(50),
                available: dec!(40),
            })
        );
        assert_eq!(
            bill.set_rest_of_products_price(ron(dec!(30))),
            Err(BillError::OverAllocated {
                allocated: dec!(50),
                available: dec!(30),
            })
        );
        assert_eq!(bill, before);

        bill.set_total_price(ron(dec!(50))).unwrap();
        assert!(bill.compute_owed().is_ok());
    }

    #[test]
    fn test_initial_fixed_amount_set_against_rest_not_total() {
        let bill = BillBuilder::new()
            .with_total(ron(dec!(100)))
            .with_split_product(ron(dec!(70)))
            .build();
        let owner = bill.owner().id;
        let payers = vec![Payer::fixed(owner, ron(dec!(50))).unwrap()];

        let mut edited = bill.clone();
        assert_eq!(
            edited.set_initial_payers(payers),
            Err(BillError::OverAllocated {
                allocated: dec!(50),
                available: dec!(30),
            })
        );
        assert_eq!(edited, bill);
    }

    #[test]
    fn test_nobody_paying_the_rest() {
        let mut bill = bill_with_total(ron(dec!(50)));
        let nobody: Vec<Payer> = bill.roster().ids().map(Payer::unassigned).collect();
        bill.set_initial_payers(nobody).unwrap();

        assert!(matches!(bill.compute_owed(), Err(BillError::NoPayersAssigned(_))));
    }

    #[test]
    fn test_uncommitted_product_owes_nothing() {
        let mut bill = bill_with_total(ron(dec!(50)));
        let index = bill.add_new_product(bill.default_payers()).unwrap();
        bill.set_product_price(index, ron(dec!(20))).unwrap();

        let owed = bill.compute_owed().unwrap();
        assert_eq!(owed.total().unwrap(), ron(dec!(50)));
    }
}

// ============================================================================
// Bill details and ownership
// ============================================================================

mod details_tests {
    use super::*;

    #[test]
    fn test_set_details_validates_lengths() {
        let mut bill = BillBuilder::new().build();

        bill.set_details(BillDetails::new("Dinner").with_description("Friday"))
            .unwrap();
        assert_eq!(bill.details().title, "Dinner");

        assert!(matches!(
            bill.set_details(BillDetails::new("")),
            Err(BillError::ValidationFailed(_))
        ));
        assert!(matches!(
            bill.set_details(BillDetails::new("x".repeat(51))),
            Err(BillError::ValidationFailed(_))
        ));
        assert_eq!(bill.details().title, "Dinner");
    }

    #[test]
    fn test_only_owner_passes_owner_check() {
        let members = MemberFixtures::members(2);
        let creator = members[0].clone();
        let other = members[1].id;
        let bill = BillBuilder::new().with_members(members).build();

        assert!(bill.ensure_owner(&creator.id).is_ok());
        assert_eq!(bill.ensure_owner(&other), Err(BillError::NotOwner(other)));
    }

    #[test]
    fn test_creator_joins_roster() {
        let creator = MemberFixtures::named("Radu Pop", "radu_pop");
        let bill = BillBuilder::new()
            .with_members(MemberFixtures::members(2))
            .with_creator(creator.clone())
            .build();

        assert_eq!(bill.roster().len(), 3);
        assert!(bill.roster().contains(&creator.id));
        assert_eq!(bill.owner(), &creator);
    }
}
