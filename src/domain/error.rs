//! Domain Error Types
//!
//! Business-rule and validation failures. None of these leave anything
//! behind in the store: validation happens before a unit of work begins,
//! and rule violations inside a unit roll it back.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::{AmountError, Currency, CurrencyError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Debit would take the account below zero
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        account_id: Uuid,
        required: Decimal,
        available: Decimal,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error(transparent)]
    InvalidCurrency(#[from] CurrencyError),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    #[error("Currency mismatch on account {account_id}: account holds {expected}, request used {found}")]
    CurrencyMismatch {
        account_id: Uuid,
        expected: Currency,
        found: Currency,
    },
}

impl DomainError {
    pub fn insufficient_funds(account_id: Uuid, required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            account_id,
            required,
            available,
        }
    }

    /// Rejected input, detected before or without touching balances
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidCurrency(_)
                | Self::MissingField(_)
                | Self::SameAccountTransfer
                | Self::CurrencyMismatch { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound(_) | Self::TransactionNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(Uuid::nil(), dec!(100), dec!(50));

        assert!(!err.is_validation_error());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));
    }

    #[test]
    fn test_validation_errors() {
        let err: DomainError = AmountError::NotPositive(Decimal::ZERO).into();
        assert!(err.is_validation_error());

        let err: DomainError = CurrencyError("x".to_string()).into();
        assert!(err.is_validation_error());
        assert!(DomainError::MissingField("amount").is_validation_error());
    }

    #[test]
    fn test_not_found_errors() {
        assert!(DomainError::AccountNotFound(Uuid::nil()).is_not_found());
        assert!(DomainError::TransactionNotFound(Uuid::nil()).is_not_found());
    }
}
