//! Bill Domain Ports
//!
//! The bill domain needs two things from the outside world: the members of
//! the group a bill is created in, and somewhere to keep bills. Both are
//! traits so that the application service can run against a database, a
//! remote group service, or the in-memory adapters in [`mock`].
//!
//! ```rust,ignore
//! let service = BillService::new(
//!     Arc::new(MockGroupRoster::with_group(group_id, members).await),
//!     Arc::new(MockBillRepository::new()),
//!     BillConfig::default(),
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{BillId, DomainPort, GroupId, PortError};

use crate::bill::Bill;
use crate::member::Member;

/// Source of group membership
#[async_trait]
pub trait GroupRosterPort: DomainPort {
    /// Returns the members of a group
    ///
    /// # Returns
    ///
    /// The members, or `PortError::NotFound` for an unknown group
    async fn get_members(&self, group_id: GroupId) -> Result<Vec<Member>, PortError>;
}

/// Bill persistence
#[async_trait]
pub trait BillRepositoryPort: DomainPort {
    /// Loads a bill by ID, or fails with `PortError::NotFound`
    async fn load_bill(&self, id: BillId) -> Result<Bill, PortError>;

    /// Inserts or replaces a bill and returns the stored version
    async fn save_bill(&self, bill: &Bill) -> Result<Bill, PortError>;

    /// Deletes a bill, or fails with `PortError::NotFound`
    async fn delete_bill(&self, id: BillId) -> Result<(), PortError>;
}

/// In-memory adapters for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory group membership
    #[derive(Debug, Default)]
    pub struct MockGroupRoster {
        groups: Arc<RwLock<HashMap<GroupId, Vec<Member>>>>,
    }

    impl MockGroupRoster {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates one group
        pub async fn with_group(group_id: GroupId, members: Vec<Member>) -> Self {
            let port = Self::new();
            port.set_members(group_id, members).await;
            port
        }

        pub async fn set_members(&self, group_id: GroupId, members: Vec<Member>) {
            self.groups.write().await.insert(group_id, members);
        }
    }

    impl DomainPort for MockGroupRoster {}

    #[async_trait]
    impl GroupRosterPort for MockGroupRoster {
        async fn get_members(&self, group_id: GroupId) -> Result<Vec<Member>, PortError> {
            self.groups
                .read()
                .await
                .get(&group_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Group", group_id))
        }
    }

    /// In-memory bill store
    ///
    /// Bills are kept as JSON documents, so everything saved goes through
    /// the same serde path a real store would use. Decoded bills must pass
    /// [`Bill::check_integrity`]. Saves are last-write-wins.
    #[derive(Debug, Default)]
    pub struct MockBillRepository {
        bills: Arc<RwLock<HashMap<BillId, Value>>>,
    }

    impl MockBillRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored bills
        pub async fn len(&self) -> usize {
            self.bills.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.bills.read().await.is_empty()
        }
    }

    impl DomainPort for MockBillRepository {}

    fn decode_bill(document: Value) -> Result<Bill, PortError> {
        let bill: Bill = serde_json::from_value(document).map_err(PortError::serialization)?;
        bill.check_integrity().map_err(PortError::serialization)?;
        Ok(bill)
    }

    #[async_trait]
    impl BillRepositoryPort for MockBillRepository {
        async fn load_bill(&self, id: BillId) -> Result<Bill, PortError> {
            let document = self
                .bills
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Bill", id))?;
            decode_bill(document)
        }

        async fn save_bill(&self, bill: &Bill) -> Result<Bill, PortError> {
            let document = serde_json::to_value(bill).map_err(PortError::serialization)?;
            self.bills.write().await.insert(bill.id(), document.clone());
            decode_bill(document)
        }

        async fn delete_bill(&self, id: BillId) -> Result<(), PortError> {
            self.bills
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Bill", id))
        }
    }

}
