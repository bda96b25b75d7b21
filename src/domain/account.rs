//! Account model
//!
//! An account holds a non-negative monetary balance. Accounts are created
//! out-of-band (schema seed or test helpers) and mutated exclusively through
//! [`TransactionService::apply`](crate::service::TransactionService::apply).

use rust_decimal::Decimal;
use serde::Serialize;

/// A bank account as held by the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Unique identifier, immutable, assigned at creation.
    pub id: i64,
    /// Display label.
    pub name: String,
    /// Current balance. Invariant: `balance >= 0` before and after every
    /// committed transaction.
    pub balance: Decimal,
}
