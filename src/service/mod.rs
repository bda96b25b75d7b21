//! Transaction service
//!
//! The single balance-mutating operation the rest of the system depends on.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::{Amount, DomainError, TransactionRecord, TransactionType};
use crate::error::{AppError, AppResult};
use crate::store::{AccountHold as _, AccountStore};

/// The committed outcome of a successful [`TransactionService::apply`].
#[derive(Debug, Clone)]
pub struct AppliedTransaction {
    pub new_balance: Decimal,
    pub entry: TransactionRecord,
}

/// Orchestrates one deposit/withdraw request against the account store,
/// enforcing the non-negative-balance invariant under the store's exclusive
/// per-account hold.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn AccountStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Apply a monetary transaction to an account as one atomic unit of work.
    ///
    /// Exactly one balance mutation and one log append happen per successful
    /// call; any failure leaves the store untouched. Concurrent calls against
    /// the same account serialize on the store's exclusive hold; calls
    /// against different accounts proceed independently. No retries are
    /// performed here; transient storage failures are the caller's to retry.
    pub async fn apply(
        &self,
        account_id: i64,
        amount: Decimal,
        kind: TransactionType,
    ) -> AppResult<AppliedTransaction> {
        // Validate before touching storage.
        let amount = Amount::new(amount)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {e}")))?;

        let hold = self
            .store
            .lock_for_update(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;

        let current = hold.account().balance;
        let candidate = match kind {
            TransactionType::Deposit => current + amount.value(),
            TransactionType::Withdraw => current - amount.value(),
        };

        if kind == TransactionType::Withdraw && candidate < Decimal::ZERO {
            hold.release().await?;
            return Err(DomainError::InsufficientBalance {
                required: amount.value(),
                available: current,
            }
            .into());
        }

        // Balance write and log append commit together or not at all.
        let entry = hold.commit(candidate, amount.value(), kind).await?;

        tracing::debug!(
            account_id,
            kind = kind.as_str(),
            amount = %amount,
            new_balance = %candidate,
            "transaction committed"
        );

        Ok(AppliedTransaction {
            new_balance: candidate,
            entry,
        })
    }
}
