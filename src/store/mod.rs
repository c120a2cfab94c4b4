//! Ledger Store module
//!
//! Persistence boundary for accounts, transactions and ledger entries.
//!
//! A store hands out units of work. Everything a money movement writes goes
//! through one unit and becomes visible to other readers only when that
//! unit commits. Dropping a unit without committing rolls it back, so an
//! early return or a cancelled request can never leave a partial write.
//!
//! Two backends are provided: [`PgLedgerStore`] on PostgreSQL and
//! [`MemoryLedgerStore`] kept in process for tests and local runs.

mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, LedgerEntry, Transaction, TransactionStatus};
use crate::ledger::EntryTotals;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Read access outside any unit of work, plus the unit factory.
///
/// Reads here observe committed data only.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    type Unit: UnitOfWork;

    /// Begin a new atomic unit of work
    async fn begin(&self) -> StoreResult<Self::Unit>;

    async fn insert_account(&self, account: &Account) -> StoreResult<()>;

    async fn find_account(&self, account_id: Uuid) -> StoreResult<Option<Account>>;

    /// Credit and debit totals over committed entries
    async fn entry_totals(&self, account_id: Uuid) -> StoreResult<EntryTotals>;

    /// Entries for one account, ascending by creation time
    async fn ledger_entries(&self, account_id: Uuid) -> StoreResult<Vec<LedgerEntry>>;

    async fn find_transaction(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>>;

    /// Cheap liveness probe
    async fn ping(&self) -> StoreResult<()>;
}

/// One atomic, isolated unit of work.
///
/// Exclusive holds taken with [`UnitOfWork::lock_account`] last until
/// [`UnitOfWork::commit`] or [`UnitOfWork::rollback`] (or drop).
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read an account without taking a hold on it
    async fn find_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>>;

    /// Take an exclusive hold on an account and return it.
    ///
    /// Returns `None` when the account does not exist. Taking a hold the
    /// unit already owns is a no-op.
    async fn lock_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>>;

    /// Credit and debit totals as seen from inside this unit, including
    /// its own uncommitted entries
    async fn entry_totals(&mut self, account_id: Uuid) -> StoreResult<EntryTotals>;

    async fn insert_transaction(&mut self, transaction: &Transaction) -> StoreResult<()>;

    async fn insert_entry(&mut self, entry: &LedgerEntry) -> StoreResult<()>;

    async fn set_transaction_status(
        &mut self,
        transaction_id: Uuid,
        status: TransactionStatus,
    ) -> StoreResult<()>;

    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;
}
