//! Ledger records
//!
//! Accounts, transactions and ledger entries as they are persisted.
//! Enumerations round-trip through their lower-case text form, which is
//! also what the database columns hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Amount, Balance, Currency};

/// Unrecognised text for one of the ledger enumerations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

// =========================================================================
// Account
// =========================================================================

/// A holder of funds. Its balance is never stored; see `AccountWithBalance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_type: String,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: Uuid, account_type: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_type: account_type.into(),
            currency,
            created_at: Utc::now(),
        }
    }
}

/// Account joined with its derived balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountWithBalance {
    #[serde(flatten)]
    pub account: Account,
    pub balance: Balance,
}

// =========================================================================
// Transaction
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
}

text_enum!(TransactionType, "transaction type", {
    Deposit => "deposit",
    Withdrawal => "withdrawal",
    Transfer => "transfer",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

text_enum!(TransactionStatus, "transaction status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

/// One requested money movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub source_account: Option<Uuid>,
    pub destination_account: Option<Uuid>,
    pub amount: Amount,
    pub currency: Currency,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// LedgerEntry
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Credit,
    Debit,
}

text_enum!(EntryType, "entry type", {
    Credit => "credit",
    Debit => "debit",
});

/// Immutable ledger fact. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_enum_text_round_trip() {
        for t in [TransactionType::Deposit, TransactionType::Withdrawal, TransactionType::Transfer] {
            assert_eq!(t.as_str().parse::<TransactionType>().unwrap(), t);
        }
        assert_eq!("completed".parse::<TransactionStatus>().unwrap(), TransactionStatus::Completed);
        assert_eq!(EntryType::Debit.to_string(), "debit");
    }

    #[test]
    fn test_unknown_variant() {
        let err = "refund".parse::<TransactionType>().unwrap_err();
        assert_eq!(err.kind, "transaction type");
        assert!(err.to_string().contains("refund"));
    }

    #[test]
    fn test_transaction_serializes_type_field() {
        let tx = Transaction {
            id: Uuid::nil(),
            transaction_type: TransactionType::Withdrawal,
            source_account: Some(Uuid::nil()),
            destination_account: None,
            amount: Amount::new(dec!(12.5)).unwrap(),
            currency: "usd".parse().unwrap(),
            status: TransactionStatus::Completed,
            description: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "withdrawal");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["amount"], "12.5");
        assert_eq!(json["currency"], "USD");
        assert!(json["destination_account"].is_null());
    }

    #[test]
    fn test_account_with_balance_flattens() {
        let account = Account::new(Uuid::new_v4(), "checking", "EUR".parse().unwrap());
        let view = AccountWithBalance {
            account: account.clone(),
            balance: Balance::from_decimal(dec!(42)),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], account.id.to_string());
        assert_eq!(json["account_type"], "checking");
        assert_eq!(json["balance"], "42");
    }
}
