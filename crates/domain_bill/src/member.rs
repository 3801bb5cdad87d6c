//! Group members and the bill roster
//!
//! Members are reference data owned by the group membership provider. A bill
//! keeps a snapshot of them (the roster) and validates every payer against it.

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::MemberId;

use crate::error::BillError;

/// A participant that can pay for a bill or a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Member {
    pub id: MemberId,
    /// Full name shown in payer lists
    #[validate(length(max = 50))]
    pub display_name: String,
    #[validate(length(min = 5, max = 20))]
    pub username: String,
}

impl Member {
    /// Creates a member, validating name lengths
    pub fn new(
        id: MemberId,
        display_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self, BillError> {
        let member = Self {
            id,
            display_name: display_name.into(),
            username: username.into(),
        };
        member.validate()?;
        Ok(member)
    }
}

/// Snapshot of the members a bill can be split between
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Builds a roster, dropping repeated entries for the same member id
    pub fn new(members: impl IntoIterator<Item = Member>) -> Self {
        let mut roster = Self::default();
        for member in members {
            roster.insert(member);
        }
        roster
    }

    /// Adds a member unless one with the same id is already present.
    /// Returns true if the member was added.
    pub fn insert(&mut self, member: Member) -> bool {
        if self.contains(&member.id) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.members.iter().any(|m| &m.id == id)
    }

    pub fn get(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    /// Fails with `UnknownMember` unless `id` is on the roster
    pub fn require(&self, id: &MemberId) -> Result<&Member, BillError> {
        self.get(id).ok_or(BillError::UnknownMember(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Member> for Roster {
    fn from_iter<T: IntoIterator<Item = Member>>(iter: T) -> Self {
        Self::new(iter)
    }
}
