//! Ledger core
//!
//! The pieces every money movement is assembled from: balance derivation,
//! the locking policy and the append-only writer.

pub mod balance;
pub mod locking;
pub mod writer;

pub use balance::{BalanceCalculator, EntryTotals};
pub use locking::{lock_order, AccountHold, AccountLocks};
pub use writer::{LedgerWriter, TransactionDraft, WrittenTransaction};
