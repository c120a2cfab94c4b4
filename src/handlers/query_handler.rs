//! Read-side queries over committed ledger data

use uuid::Uuid;

use crate::domain::{AccountWithBalance, DomainError, LedgerEntry, Transaction};
use crate::error::AppResult;
use crate::ledger::BalanceCalculator;
use crate::store::LedgerStore;

pub struct AccountQueries<S> {
    store: S,
}

impl<S: LedgerStore> AccountQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Account plus its balance derived from committed entries
    pub async fn account_with_balance(&self, account_id: Uuid) -> AppResult<AccountWithBalance> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;
        let balance = BalanceCalculator::committed(&self.store, account_id).await?;

        Ok(AccountWithBalance { account, balance })
    }

    /// Every entry on the account, oldest first.
    ///
    /// An unknown account is an error rather than an empty ledger.
    pub async fn ledger(&self, account_id: Uuid) -> AppResult<Vec<LedgerEntry>> {
        if self.store.find_account(account_id).await?.is_none() {
            return Err(DomainError::AccountNotFound(account_id).into());
        }
        Ok(self.store.ledger_entries(account_id).await?)
    }

    pub async fn transaction(&self, transaction_id: Uuid) -> AppResult<Transaction> {
        Ok(self
            .store
            .find_transaction(transaction_id)
            .await?
            .ok_or(DomainError::TransactionNotFound(transaction_id))?)
    }
}
