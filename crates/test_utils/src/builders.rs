//! Test Data Builders
//!
//! Provides builder patterns for constructing bills with sensible defaults.
//! Tests specify only what they care about: how many members, the total, and
//! which products are already itemized.

use std::sync::Arc;

use core_kernel::{Currency, GroupId, Money};
use domain_bill::ports::mock::{MockBillRepository, MockGroupRoster};
use domain_bill::{Bill, BillConfig, BillService, Member};

use crate::fixtures::MemberFixtures;

/// Builder for bills in a known state
///
/// Products are itemized out of the rest bucket in the order they were
/// added, each one committed and paid for by every roster member evenly.
pub struct BillBuilder {
    members: Vec<Member>,
    creator: Option<Member>,
    currency: Currency,
    total: Option<Money>,
    split_products: Vec<Money>,
    new_products: Vec<Money>,
    everyone_pays_rest: bool,
    product_limit: Option<usize>,
}

impl Default for BillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BillBuilder {
    /// Creates a builder for a bill with three members, the first of them the creator
    pub fn new() -> Self {
        Self {
            members: MemberFixtures::members(3),
            creator: None,
            currency: Currency::RON,
            total: None,
            split_products: Vec::new(),
            new_products: Vec::new(),
            everyone_pays_rest: false,
            product_limit: None,
        }
    }

    /// Replaces the members; the first one creates the bill unless a creator is set
    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn with_creator(mut self, creator: Member) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the bill total before any product is itemized
    pub fn with_total(mut self, total: Money) -> Self {
        self.total = Some(total);
        self
    }

    /// Itemizes a committed product out of the rest bucket
    pub fn with_split_product(mut self, price: Money) -> Self {
        self.split_products.push(price);
        self
    }

    /// Adds a committed product on top of the total
    pub fn with_new_product(mut self, price: Money) -> Self {
        self.new_products.push(price);
        self
    }

    /// Makes every roster member share the rest evenly
    pub fn with_everyone_paying_rest(mut self) -> Self {
        self.everyone_pays_rest = true;
        self
    }

    pub fn with_product_limit(mut self, limit: usize) -> Self {
        self.product_limit = Some(limit);
        self
    }

    /// Builds the bill
    ///
    /// # Panics
    ///
    /// Panics if the requested state is not reachable, e.g. split products
    /// that add up to more than the total.
    pub fn build(self) -> Bill {
        let mut members = self.members.into_iter();
        let creator = match self.creator {
            Some(creator) => creator,
            None => members.next().expect("bill builder needs at least one member"),
        };

        let mut bill = Bill::initialize(members, creator, self.currency);
        if let Some(limit) = self.product_limit {
            bill = bill.with_product_limit(limit);
        }
        if let Some(total) = self.total {
            bill.set_total_price(total).expect("builder total is valid");
        }
        if self.everyone_pays_rest {
            let payers = bill.default_payers();
            bill.set_initial_payers(payers).expect("default payers are valid");
        }

        for price in self.split_products {
            let index = bill
                .split_product_from_rest(bill.default_payers())
                .expect("split product can be started");
            bill.set_product_price(index, price).expect("split price is valid");
            bill.commit_product_price(index).expect("rest covers split product");
        }
        for price in self.new_products {
            let index = bill
                .add_new_product(bill.default_payers())
                .expect("new product can be started");
            bill.set_product_price(index, price).expect("new product price is valid");
            bill.commit_product_price(index).expect("new product commits");
        }

        bill
    }
}

/// A [`BillService`] wired to in-memory adapters, with one group of members
pub struct ServiceHarness {
    pub service: BillService,
    pub repository: Arc<MockBillRepository>,
    pub roster: Arc<MockGroupRoster>,
    pub group_id: GroupId,
    pub members: Vec<Member>,
}

impl ServiceHarness {
    /// A harness whose group has `member_count` members
    pub async fn new(member_count: usize) -> Self {
        Self::with_config(member_count, BillConfig::default()).await
    }

    pub async fn with_config(member_count: usize, config: BillConfig) -> Self {
        let group_id = GroupId::new();
        let members = MemberFixtures::members(member_count);
        let roster = Arc::new(MockGroupRoster::with_group(group_id, members.clone()).await);
        let repository = Arc::new(MockBillRepository::new());
        let service = BillService::new(roster.clone(), repository.clone(), config);

        Self {
            service,
            repository,
            roster,
            group_id,
            members,
        }
    }

    /// The first group member, who creates bills in most tests
    pub fn owner(&self) -> &Member {
        &self.members[0]
    }
}
