//! Command definitions
//!
//! Commands carry raw request values; handlers validate them before any
//! unit of work begins.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Amount, TransactionStatus, TransactionType};

// =========================================================================
// CreateAccountCommand
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub user_id: Uuid,
    pub account_type: String,
    pub currency: String,
}

impl CreateAccountCommand {
    pub fn new(user_id: Uuid, account_type: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            user_id,
            account_type: account_type.into(),
            currency: currency.into(),
        }
    }
}

// =========================================================================
// DepositCommand / WithdrawCommand
// =========================================================================

/// Credit an account from outside the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositCommand {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
}

impl DepositCommand {
    pub fn new(account_id: Uuid, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            account_id,
            amount,
            currency: currency.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Debit an account to outside the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCommand {
    pub account_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
}

impl WithdrawCommand {
    pub fn new(account_id: Uuid, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            account_id,
            amount,
            currency: currency.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Move funds between two ledger accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub source_account: Uuid,
    pub destination_account: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
}

impl TransferCommand {
    pub fn new(
        source_account: Uuid,
        destination_account: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            source_account,
            destination_account,
            amount,
            currency: currency.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of a completed money movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_id: Uuid,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: Amount,
}

impl TransactionReceipt {
    pub fn message(&self) -> &'static str {
        match self.transaction_type {
            TransactionType::Deposit => "Deposit successful",
            TransactionType::Withdrawal => "Withdrawal successful",
            TransactionType::Transfer => "Transfer successful",
        }
    }
}
