//! Command Handlers module
//!
//! The money-movement operations. Each handler validates its command,
//! opens one unit of work, runs its steps through it, and then settles the
//! unit: commit on success, rollback on every other outcome.

mod account_handler;
mod commands;
mod deposit_handler;
mod query_handler;
mod transfer_handler;
mod withdraw_handler;


pub use account_handler::CreateAccountHandler;
pub use commands::*;
pub use deposit_handler::DepositHandler;
pub use query_handler::AccountQueries;
pub use transfer_handler::TransferHandler;
pub use withdraw_handler::WithdrawHandler;

use crate::domain::{Account, Amount, Currency, DomainError};
use crate::error::{AppError, AppResult};
use crate::store::UnitOfWork;

/// Finish a unit of work according to `outcome`.
///
/// A failed commit is logged and reported as the error. A failed rollback
/// is only logged: the store discards the unit anyway once it is dropped,
/// and the original failure is what the caller needs to see.
pub(crate) async fn settle<U: UnitOfWork, T>(unit: U, outcome: AppResult<T>) -> AppResult<T> {
    match outcome {
        Ok(value) => {
            if let Err(commit_err) = unit.commit().await {
                tracing::error!(error = %commit_err, "Commit failed");
                return Err(commit_err.into());
            }
            Ok(value)
        }
        Err(err) => {
            if err.is_infrastructure() {
                tracing::error!(error = %err, "Ledger unit failed, rolling back");
            } else {
                tracing::warn!(error = %err, "Ledger unit rejected, rolling back");
            }
            if let Err(rollback_err) = unit.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Amount and currency checks shared by every money movement
pub(crate) fn validate_movement(
    amount: rust_decimal::Decimal,
    currency: &str,
) -> Result<(Amount, Currency), DomainError> {
    if currency.trim().is_empty() {
        return Err(DomainError::MissingField("currency"));
    }
    let amount = Amount::new(amount)?;
    let currency = currency.parse()?;
    Ok((amount, currency))
}

/// Currency is recorded, never converted, so it has to match the account
pub(crate) fn ensure_currency(account: &Account, currency: &Currency) -> Result<(), AppError> {
    if &account.currency != currency {
        return Err(DomainError::CurrencyMismatch {
            account_id: account.id,
            expected: account.currency.clone(),
            found: currency.clone(),
        }
        .into());
    }
    Ok(())
}
