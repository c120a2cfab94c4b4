//! ledger_core Library
//!
//! Double-entry ledger: accounts, deposits, withdrawals and transfers, with
//! balances always derived from append-only ledger entries.
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod handlers;
pub mod ledger;
pub mod store;

pub use config::{Config, ConfigError, LogFormat};
pub use domain::{
    Account, AccountWithBalance, Amount, AmountError, Balance, Currency, DomainError, EntryType,
    LedgerEntry, OperationContext, Transaction, TransactionStatus, TransactionType,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use store::{LedgerStore, MemoryLedgerStore, PgLedgerStore, StoreError, UnitOfWork};
