//! Core Kernel - Foundational types for the bill splitting system
//!
//! This crate provides the building blocks shared by the domain crates:
//! - Money types with precise decimal arithmetic
//! - Strongly typed identifiers for members, groups, bills and payments
//! - The error type and marker trait shared by every port

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{MemberId, GroupId, BillId, PaymentId};
pub use ports::{PortError, DomainPort};
