//! In-process ledger store.
//!
//! Committed state lives behind one `RwLock`; a unit of work stages its
//! writes locally and publishes them in a single write-locked step on
//! commit. Exclusive account holds come from [`AccountLocks`] and are owned
//! by the unit, so they are released only after its writes are visible.
//!
//! Foreign-key style checks mirror the PostgreSQL schema: entries must
//! reference an existing account and a transaction from the same unit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, LedgerEntry, Transaction, TransactionStatus};
use crate::ledger::{AccountHold, AccountLocks, EntryTotals};

use super::{LedgerStore, StoreError, StoreResult, UnitOfWork};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, Transaction>,
    /// Commit order
    entries: Vec<LedgerEntry>,
}

impl State {
    fn entries_for(&self, account_id: Uuid) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.account_id == account_id)
    }
}

/// Ledger store kept in memory. Intended for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<RwLock<State>>,
    locks: AccountLocks,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail as if the store had gone away.
    ///
    /// The affected unit is discarded like any other failed commit.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of committed transaction rows
    pub fn transaction_count(&self) -> usize {
        self.read().map(|s| s.transactions.len()).unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        read_state(&self.state)
    }
}

fn read_state(state: &RwLock<State>) -> StoreResult<RwLockReadGuard<'_, State>> {
    state
        .read()
        .map_err(|_| StoreError::Unavailable("state lock poisoned".to_string()))
}

fn write_state(state: &RwLock<State>) -> StoreResult<RwLockWriteGuard<'_, State>> {
    state
        .write()
        .map_err(|_| StoreError::Unavailable("state lock poisoned".to_string()))
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> StoreResult<MemoryUnit> {
        Ok(MemoryUnit {
            state: Arc::clone(&self.state),
            locks: self.locks.clone(),
            fail_next_commit: Arc::clone(&self.fail_next_commit),
            holds: Vec::new(),
            transactions: Vec::new(),
            entries: Vec::new(),
        })
    }

    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let mut state = write_state(&self.state)?;
        if state.accounts.contains_key(&account.id) {
            return Err(StoreError::Constraint(format!(
                "duplicate account id {}",
                account.id
            )));
        }
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_account(&self, account_id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.read()?.accounts.get(&account_id).cloned())
    }

    async fn entry_totals(&self, account_id: Uuid) -> StoreResult<EntryTotals> {
        Ok(EntryTotals::fold(self.read()?.entries_for(account_id)))
    }

    async fn ledger_entries(&self, account_id: Uuid) -> StoreResult<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> =
            self.read()?.entries_for(account_id).cloned().collect();
        // stable: commit order breaks ties
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn find_transaction(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        Ok(self.read()?.transactions.get(&transaction_id).cloned())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}

/// Unit of work over [`MemoryLedgerStore`].
///
/// Staged rows are discarded and holds released when the unit is dropped
/// without committing.
#[derive(Debug)]
pub struct MemoryUnit {
    state: Arc<RwLock<State>>,
    locks: AccountLocks,
    fail_next_commit: Arc<AtomicBool>,
    holds: Vec<AccountHold>,
    transactions: Vec<Transaction>,
    entries: Vec<LedgerEntry>,
}

impl MemoryUnit {
    fn holds(&self, account_id: Uuid) -> bool {
        self.holds.iter().any(|h| h.account_id() == account_id)
    }

    fn account_exists(&self, account_id: Uuid) -> StoreResult<bool> {
        Ok(read_state(&self.state)?.accounts.contains_key(&account_id))
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn find_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>> {
        Ok(read_state(&self.state)?.accounts.get(&account_id).cloned())
    }

    async fn lock_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>> {
        if !self.holds(account_id) {
            let hold = self.locks.acquire(account_id).await;
            self.holds.push(hold);
        }
        Ok(read_state(&self.state)?.accounts.get(&account_id).cloned())
    }

    async fn entry_totals(&mut self, account_id: Uuid) -> StoreResult<EntryTotals> {
        let state = read_state(&self.state)?;
        let staged = self.entries.iter().filter(|e| e.account_id == account_id);
        Ok(EntryTotals::fold(state.entries_for(account_id).chain(staged)))
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> StoreResult<()> {
        for account_id in [transaction.source_account, transaction.destination_account]
            .into_iter()
            .flatten()
        {
            if !self.account_exists(account_id)? {
                return Err(StoreError::Constraint(format!(
                    "transaction {} references unknown account {}",
                    transaction.id, account_id
                )));
            }
        }
        self.transactions.push(transaction.clone());
        Ok(())
    }

    async fn insert_entry(&mut self, entry: &LedgerEntry) -> StoreResult<()> {
        if !self.transactions.iter().any(|t| t.id == entry.transaction_id) {
            return Err(StoreError::Constraint(format!(
                "entry {} references unknown transaction {}",
                entry.id, entry.transaction_id
            )));
        }
        if !self.account_exists(entry.account_id)? {
            return Err(StoreError::Constraint(format!(
                "entry {} references unknown account {}",
                entry.id, entry.account_id
            )));
        }
        self.entries.push(entry.clone());
        Ok(())
    }

    async fn set_transaction_status(
        &mut self,
        transaction_id: Uuid,
        status: TransactionStatus,
    ) -> StoreResult<()> {
        let transaction = self
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| {
                StoreError::Constraint(format!("transaction {transaction_id} not in this unit"))
            })?;
        transaction.status = status;
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("commit failed".to_string()));
        }

        {
            let mut state = write_state(&self.state)?;
            for transaction in self.transactions {
                state.transactions.insert(transaction.id, transaction);
            }
            state.entries.extend(self.entries);
        }

        // holds go last, after the writes are visible
        drop(self.holds);
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        Ok(())
    }
}
