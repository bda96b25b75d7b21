//! bms-backend Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod service;
pub mod store;

pub use config::Config;
pub use domain::{Account, Amount, AmountError, DomainError, TransactionRecord, TransactionType};
pub use error::{AppError, AppResult};
pub use service::{AppliedTransaction, TransactionService};
