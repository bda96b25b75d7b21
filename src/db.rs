//! Database module
//!
//! Schema bootstrap and seeding for the Postgres backend.

use rust_decimal::Decimal;
use sqlx::PgPool;

/// Simple connectivity check.
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Create the tables and index the store relies on, if missing.
///
/// `transactions` is append-only; the balance invariant and the positive
/// amount rule are restated as CHECK constraints so a bug upstream cannot
/// persist an invalid row.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            balance NUMERIC(15, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id BIGSERIAL PRIMARY KEY,
            account_id BIGINT NOT NULL REFERENCES accounts(id),
            amount NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
            "type" TEXT NOT NULL CHECK ("type" IN ('DEPOSIT', 'WITHDRAW')),
            transaction_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_transactions_account_date
        ON transactions (account_id, transaction_date DESC)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("database schema verified");
    Ok(())
}

/// Demo accounts created on first boot against an empty database.
pub const DEMO_ACCOUNTS: &[(&str, Decimal)] = &[
    ("Checking", Decimal::from_parts(100000, 0, 0, false, 2)),
    ("Savings", Decimal::from_parts(250000, 0, 0, false, 2)),
];

/// Seed demo accounts when the accounts table is empty, so a fresh install
/// has something to show.
pub async fn seed_demo_accounts(pool: &PgPool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    for (name, balance) in DEMO_ACCOUNTS {
        sqlx::query("INSERT INTO accounts (name, balance) VALUES ($1, $2)")
            .bind(name)
            .bind(balance)
            .execute(pool)
            .await?;
    }

    tracing::info!("seeded {} demo accounts", DEMO_ACCOUNTS.len());
    Ok(())
}
