//! Account store
//!
//! The store is the sole gate through which balance reads and writes happen.
//! [`AccountStore`] provides plain reads plus [`AccountStore::lock_for_update`],
//! which hands out an exclusive per-account hold. A hold serializes all
//! writers of one account while leaving other accounts untouched; the balance
//! write and the log append committed through it succeed or fail as a pair.

mod memory;
mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Account, TransactionRecord, TransactionType};

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

/// Errors surfaced by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored value: {0}")]
    Decode(String),
}

/// Authoritative holder of current balances and the transaction log.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Plain read of one account. No locking; used for listing and display.
    async fn get(&self, account_id: i64) -> Result<Option<Account>, StoreError>;

    /// All accounts, ordered by id ascending.
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    /// Log entries for one account, newest first. An unknown account yields
    /// an empty list, matching the read contract of the HTTP surface.
    async fn transactions_for(
        &self,
        account_id: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Acquire an exclusive hold on exactly one account record.
    ///
    /// Blocks until any in-flight hold on the same account is released.
    /// Holds on different accounts never block each other. Returns `None`
    /// when the account does not exist; in that case nothing was held.
    async fn lock_for_update(
        &self,
        account_id: i64,
    ) -> Result<Option<Box<dyn AccountHold>>, StoreError>;
}

/// An exclusive hold on a single account record.
///
/// Consuming methods make writing after release unrepresentable. Dropping a
/// hold without committing releases it with nothing written (the Postgres
/// backend relies on transaction-rollback-on-drop, the in-memory backend on
/// guard drop), so the hold is released on every exit path, including panics
/// unwinding through the caller.
#[async_trait]
pub trait AccountHold: Send {
    /// The account row as read under the hold.
    fn account(&self) -> &Account;

    /// Write the new balance and append the matching log entry as one atomic
    /// unit, then release the hold. A failure in this window leaves both
    /// unwritten.
    async fn commit(
        self: Box<Self>,
        new_balance: Decimal,
        amount: Decimal,
        kind: TransactionType,
    ) -> Result<TransactionRecord, StoreError>;

    /// Release the hold without writing anything.
    async fn release(self: Box<Self>) -> Result<(), StoreError>;
}
