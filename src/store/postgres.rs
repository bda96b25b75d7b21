//! Postgres-backed account store
//!
//! The exclusive hold is a row lock: `SELECT ... FOR UPDATE` inside a
//! database transaction. Postgres queues concurrent lockers of the same row
//! and leaves other rows free, which is exactly the per-account contract.
//! Commit runs the balance `UPDATE` and the log `INSERT` inside that same
//! transaction, so the pair is atomic by storage discipline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{Account, TransactionRecord, TransactionType};

use super::{AccountHold, AccountStore, StoreError};

/// Account store over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get(&self, account_id: i64) -> Result<Option<Account>, StoreError> {
        let row: Option<(i64, String, Decimal)> =
            sqlx::query_as("SELECT id, name, balance FROM accounts WHERE id = $1")
                .bind(account_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, name, balance)| Account { id, name, balance }))
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<(i64, String, Decimal)> =
            sqlx::query_as("SELECT id, name, balance FROM accounts ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, balance)| Account { id, name, balance })
            .collect())
    }

    async fn transactions_for(
        &self,
        account_id: i64,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows: Vec<(i64, i64, Decimal, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, account_id, amount, "type", transaction_date
            FROM transactions
            WHERE account_id = $1
            ORDER BY transaction_date DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, account_id, amount, kind, transaction_date)| {
                let kind = kind
                    .parse::<TransactionType>()
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(TransactionRecord {
                    id,
                    account_id,
                    amount,
                    kind,
                    transaction_date,
                })
            })
            .collect()
    }

    async fn lock_for_update(
        &self,
        account_id: i64,
    ) -> Result<Option<Box<dyn AccountHold>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the account row for the remainder of the transaction.
        let row: Option<(i64, String, Decimal)> =
            sqlx::query_as("SELECT id, name, balance FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?;

        match row {
            None => {
                tx.rollback().await?;
                Ok(None)
            }
            Some((id, name, balance)) => Ok(Some(Box::new(PgAccountHold {
                tx,
                account: Account { id, name, balance },
            }))),
        }
    }
}

/// A held account row. Owns the open database transaction; dropping the hold
/// rolls the transaction back.
struct PgAccountHold {
    tx: Transaction<'static, Postgres>,
    account: Account,
}

#[async_trait]
impl AccountHold for PgAccountHold {
    fn account(&self) -> &Account {
        &self.account
    }

    async fn commit(
        mut self: Box<Self>,
        new_balance: Decimal,
        amount: Decimal,
        kind: TransactionType,
    ) -> Result<TransactionRecord, StoreError> {
        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(new_balance)
            .bind(self.account.id)
            .execute(&mut *self.tx)
            .await?;

        let (id, account_id, amount, kind_raw, transaction_date): (
            i64,
            i64,
            Decimal,
            String,
            DateTime<Utc>,
        ) = sqlx::query_as(
            r#"
            INSERT INTO transactions (account_id, amount, "type", transaction_date)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, account_id, amount, "type", transaction_date
            "#,
        )
        .bind(self.account.id)
        .bind(amount)
        .bind(kind.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        self.tx.commit().await?;

        let kind = kind_raw
            .parse::<TransactionType>()
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(TransactionRecord {
            id,
            account_id,
            amount,
            kind,
            transaction_date,
        })
    }

    async fn release(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
