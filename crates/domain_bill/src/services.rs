//! Bill application service
//!
//! Orchestrates the ports around the [`Bill`] aggregate: fetching group
//! members when a bill is created, persisting edits, and turning a final
//! bill into payments.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use core_kernel::{BillId, GroupId, MemberId};

use crate::allocation::OwedAmounts;
use crate::bill::{Bill, BillDetails};
use crate::config::BillConfig;
use crate::error::{BillError, ServiceError};
use crate::member::Member;
use crate::payment::{self, Payment};
use crate::ports::{BillRepositoryPort, GroupRosterPort};
use crate::settlement::{self, Contribution};

/// Service for creating, editing and settling bills
pub struct BillService {
    roster: Arc<dyn GroupRosterPort>,
    bills: Arc<dyn BillRepositoryPort>,
    config: BillConfig,
}

impl BillService {
    pub fn new(
        roster: Arc<dyn GroupRosterPort>,
        bills: Arc<dyn BillRepositoryPort>,
        config: BillConfig,
    ) -> Self {
        Self {
            roster,
            bills,
            config,
        }
    }

    pub fn config(&self) -> &BillConfig {
        &self.config
    }

    /// Creates an empty bill in a group, owned by `creator`
    ///
    /// The bill snapshots the group's current members; the creator joins the
    /// roster even if the group does not list them.
    #[instrument(skip_all, fields(group_id = %group_id, creator = %creator.id))]
    pub async fn create_bill(
        &self,
        group_id: GroupId,
        creator: Member,
        details: BillDetails,
    ) -> Result<Bill, ServiceError> {
        let members = self.roster.get_members(group_id).await?;

        let mut bill = Bill::initialize(members, creator, self.config.currency)
            .with_group(group_id)
            .with_product_limit(self.config.max_products);
        bill.set_details(details)?;

        let saved = self.bills.save_bill(&bill).await?;
        info!(bill_id = %saved.id(), members = saved.roster().len(), "Created bill");
        Ok(saved)
    }

    #[instrument(skip_all, fields(bill_id = %bill_id))]
    pub async fn get_bill(&self, bill_id: BillId) -> Result<Bill, ServiceError> {
        Ok(self.bills.load_bill(bill_id).await?)
    }

    /// Applies one ledger edit on behalf of `actor`
    ///
    /// The edit runs against a working copy; the bill is saved only if the
    /// edit succeeds, so a rejected edit leaves the stored bill untouched.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let (bill, index) = service
    ///     .edit_bill(bill_id, owner_id, |bill| bill.add_new_product(bill.default_payers()))
    ///     .await?;
    /// ```
    #[instrument(skip_all, fields(bill_id = %bill_id, actor = %actor))]
    pub async fn edit_bill<F, T>(
        &self,
        bill_id: BillId,
        actor: MemberId,
        edit: F,
    ) -> Result<(Bill, T), ServiceError>
    where
        F: FnOnce(&mut Bill) -> Result<T, BillError> + Send,
        T: Send,
    {
        let mut bill = self.bills.load_bill(bill_id).await?;
        bill.ensure_owner(&actor)?;

        let outcome = edit(&mut bill)?;
        let saved = self.bills.save_bill(&bill).await?;
        debug!(
            total = %saved.total_price(),
            rest = %saved.rest_of_products().price(),
            "Saved bill edit"
        );
        Ok((saved, outcome))
    }

    /// What each member owes for a stored bill
    #[instrument(skip_all, fields(bill_id = %bill_id))]
    pub async fn owed(&self, bill_id: BillId) -> Result<OwedAmounts, ServiceError> {
        let bill = self.bills.load_bill(bill_id).await?;
        Ok(bill.compute_owed()?)
    }

    /// Turns the bill into payments given who paid the merchant
    #[instrument(skip_all, fields(bill_id = %bill_id, actor = %actor))]
    pub async fn settle_bill(
        &self,
        bill_id: BillId,
        actor: MemberId,
        contributions: &[Contribution],
    ) -> Result<Vec<Payment>, ServiceError> {
        let bill = self.bills.load_bill(bill_id).await?;
        bill.ensure_owner(&actor)?;

        let owed = bill.compute_owed()?;
        let rounding = self.config.settlement_rounding;
        let transfers = settlement::plan_settlement(&owed, contributions, rounding)?;
        let payments: Vec<Payment> = transfers
            .iter()
            .map(|transfer| Payment::from_transfer(bill_id, transfer))
            .collect();

        info!(payments = payments.len(), "Settled bill");
        Ok(payments)
    }

    /// Deletes a bill and returns the reversals for its completed payments
    #[instrument(skip_all, fields(bill_id = %bill_id, actor = %actor))]
    pub async fn delete_bill(
        &self,
        bill_id: BillId,
        actor: MemberId,
        payments: &[Payment],
    ) -> Result<Vec<Payment>, ServiceError> {
        let bill = self.bills.load_bill(bill_id).await?;
        bill.ensure_owner(&actor)?;

        let ours: Vec<Payment> = payments
            .iter()
            .filter(|p| p.bill_id == Some(bill_id))
            .cloned()
            .collect();
        let reversals = payment::reverse_completed(&ours);

        self.bills.delete_bill(bill_id).await?;
        info!(reversals = reversals.len(), "Deleted bill");
        Ok(reversals)
    }
}
