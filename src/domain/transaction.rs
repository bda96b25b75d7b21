//! Transaction log types
//!
//! The transaction log is append-only: entries are written atomically with
//! the balance mutation they describe and are never updated or removed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DomainError;

/// The kind of balance mutation a transaction performed.
///
/// Serialized on the wire and in the database as `DEPOSIT` / `WITHDRAW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    /// The accepted spellings are exactly `DEPOSIT` and `WITHDRAW`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAW" => Ok(Self::Withdraw),
            other => Err(DomainError::UnknownTransactionType(other.to_string())),
        }
    }
}

/// An immutable record of a single deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Unique, monotonically assigned identifier.
    pub id: i64,
    /// The owning account. Non-owning reference: the log does not own the
    /// account.
    pub account_id: i64,
    /// Positive magnitude moved.
    pub amount: Decimal,
    /// Deposit or withdrawal. Kept under the original wire name `type`.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Assigned at commit time by the store, not by the caller.
    pub transaction_date: DateTime<Utc>,
}
