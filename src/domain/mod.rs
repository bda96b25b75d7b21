//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod amount;
pub mod error;
pub mod transaction;

pub use account::Account;
pub use amount::{Amount, AmountError};
pub use error::DomainError;
pub use transaction::{TransactionRecord, TransactionType};
