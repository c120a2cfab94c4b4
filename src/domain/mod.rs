//! Domain module
//!
//! Ledger records, value types and business-rule errors.

pub mod amount;
pub mod context;
pub mod currency;
pub mod error;
pub mod model;

pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use currency::{Currency, CurrencyError};
pub use error::DomainError;
pub use model::{
    Account, AccountWithBalance, EntryType, LedgerEntry, Transaction, TransactionStatus,
    TransactionType, UnknownVariant,
};
