//! In-memory account store
//!
//! The exclusive hold is a per-account `tokio::sync::Mutex` in a lock table,
//! the shape the row lock takes when there is no database underneath. Used by
//! the test suite and by the no-database demo mode. Commit mutates the
//! balance and appends the log entry with no await point in between, so the
//! pair is observed atomically by every other task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::{Account, TransactionRecord, TransactionType};

use super::{AccountHold, AccountStore, StoreError};

struct Slot {
    name: String,
    balance: RwLock<Decimal>,
    /// Per-account writer gate. Plain reads bypass it.
    gate: Arc<AsyncMutex<()>>,
}

struct Inner {
    accounts: RwLock<HashMap<i64, Arc<Slot>>>,
    log: StdMutex<Vec<TransactionRecord>>,
    next_account_id: AtomicI64,
    next_transaction_id: AtomicI64,
}

/// Account store backed by process memory. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct MemoryAccountStore {
    inner: Arc<Inner>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                accounts: RwLock::new(HashMap::new()),
                log: StdMutex::new(Vec::new()),
                next_account_id: AtomicI64::new(1),
                next_transaction_id: AtomicI64::new(1),
            }),
        }
    }

    /// Create an account with an opening balance. Account creation is
    /// out-of-band with respect to the transaction service, so this lives on
    /// the concrete type rather than on [`AccountStore`].
    pub fn insert_account(&self, name: &str, balance: Decimal) -> Account {
        let id = self.inner.next_account_id.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(Slot {
            name: name.to_string(),
            balance: RwLock::new(balance),
            gate: Arc::new(AsyncMutex::new(())),
        });
        self.inner
            .accounts
            .write()
            .expect("account table lock poisoned")
            .insert(id, slot);

        Account {
            id,
            name: name.to_string(),
            balance,
        }
    }

    fn slot(&self, account_id: i64) -> Option<Arc<Slot>> {
        self.inner
            .accounts
            .read()
            .expect("account table lock poisoned")
            .get(&account_id)
            .cloned()
    }
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.slot(account_id).map(|slot| Account {
            id: account_id,
            name: slot.name.clone(),
            balance: *slot.balance.read().expect("balance lock poisoned"),
        }))
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = {
            let table = self
                .inner
                .accounts
                .read()
                .expect("account table lock poisoned");
            table
                .iter()
                .map(|(&id, slot)| Account {
                    id,
                    name: slot.name.clone(),
                    balance: *slot.balance.read().expect("balance lock poisoned"),
                })
                .collect()
        };
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }

    async fn transactions_for(
        &self,
        account_id: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let log = self.inner.log.lock().expect("log lock poisoned");
        // Ids are assigned in insertion order, so reverse iteration is
        // newest-first with ties broken by id descending.
        Ok(log
            .iter()
            .rev()
            .filter(|entry| entry.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn lock_for_update(
        &self,
        account_id: i64,
    ) -> Result<Option<Box<dyn AccountHold>>, StoreError> {
        let Some(slot) = self.slot(account_id) else {
            return Ok(None);
        };

        // Queue behind any in-flight holder of this account. Other accounts
        // have their own gates and are unaffected.
        let guard = Arc::clone(&slot.gate).lock_owned().await;

        // Read the balance only once the gate is ours.
        let account = Account {
            id: account_id,
            name: slot.name.clone(),
            balance: *slot.balance.read().expect("balance lock poisoned"),
        };

        Ok(Some(Box::new(MemoryAccountHold {
            _guard: guard,
            slot,
            inner: Arc::clone(&self.inner),
            account,
        })))
    }
}

/// A held in-memory account. Dropping the hold releases the gate.
struct MemoryAccountHold {
    _guard: OwnedMutexGuard<()>,
    slot: Arc<Slot>,
    inner: Arc<Inner>,
    account: Account,
}

#[async_trait]
impl AccountHold for MemoryAccountHold {
    fn account(&self) -> &Account {
        &self.account
    }

    async fn commit(
        self: Box<Self>,
        new_balance: Decimal,
        amount: Decimal,
        kind: TransactionType,
    ) -> Result<TransactionRecord, StoreError> {
        let entry = TransactionRecord {
            id: self.inner.next_transaction_id.fetch_add(1, Ordering::Relaxed),
            account_id: self.account.id,
            amount,
            kind,
            transaction_date: Utc::now(),
        };

        *self.slot.balance.write().expect("balance lock poisoned") = new_balance;
        self.inner
            .log
            .lock()
            .expect("log lock poisoned")
            .push(entry.clone());

        Ok(entry)
    }

    async fn release(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
