//! Bill Domain - Price Allocation Ledger
//!
//! This crate keeps a shared bill consistent while its members itemize it.
//! A bill has a total price, a list of products and a "rest of products"
//! bucket for whatever has not been itemized yet.
//!
//! # Ledger Invariant
//!
//! At every observable point:
//!
//! ```text
//! total_price == rest_of_products.price + sum(products.total_price)
//! ```
//!
//! Product prices are edited in two steps: an edit is staged, then committed.
//! Only the commit moves money between the total, the rest bucket and the
//! product.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_bill::{Bill, Money, Currency};
//!
//! let mut bill = Bill::initialize(members, creator, Currency::RON);
//! bill.set_total_price(Money::new(dec!(100), Currency::RON))?;
//!
//! // Itemize 30 out of the rest
//! let pizza = bill.split_product_from_rest(bill.default_payers())?;
//! bill.set_product_price(pizza, Money::new(dec!(30), Currency::RON))?;
//! bill.commit_product_price(pizza)?;
//!
//! let owed = bill.compute_owed()?;
//! ```

pub mod allocation;
pub mod bill;
pub mod config;
pub mod error;
pub mod member;
pub mod payer;
pub mod payment;
pub mod ports;
pub mod product;
pub mod services;
pub mod settlement;

pub use allocation::{compute_owed, split_price, OwedAmounts};
pub use bill::{Bill, BillDetails, DEFAULT_PRODUCT_LIMIT};
pub use config::BillConfig;
pub use error::{BillError, ServiceError};
pub use member::{Member, Roster};
pub use payer::{Payer, Share};
pub use payment::{reverse_completed, Payment, PaymentMethod, PaymentStatus};
pub use ports::{BillRepositoryPort, GroupRosterPort};
pub use product::{Product, ProductOrigin, RemovalDisposition, RestOfProducts};
pub use services::BillService;
pub use settlement::{plan_settlement, Contribution, SettlementRounding, Transfer};

pub use core_kernel::{Currency, Money};
