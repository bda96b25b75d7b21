//! Domain Error Types
//!
//! Business rule violations, independent of the web/infrastructure layer.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Withdrawal would drive the balance negative
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// Target account does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    /// Transaction type was not DEPOSIT or WITHDRAW
    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),
}

impl DomainError {
    /// Check if this is a client error (the caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance { .. } | Self::UnknownTransactionType(_)
        )
    }
}
