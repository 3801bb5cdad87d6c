//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! bill splitting test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built members and amounts
//! - `builders`: Bill builder and an in-memory service harness
//! - `assertions`: Ledger and money assertion helpers
//! - `generators`: Property-based strategies for amounts and ledger edits
//! - `tracing`: One-time log subscriber for tests

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod tracing;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use crate::tracing::init_test_tracing;
