//! Balance Calculator
//!
//! A balance is the signed sum of an account's ledger entries: credits
//! count positive, debits negative, and an account with no entries sits at
//! zero. Nothing else is consulted. There is no cached balance column to
//! drift out of step with the entries.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Balance, EntryType, LedgerEntry};
use crate::store::{LedgerStore, StoreResult, UnitOfWork};

/// Credit and debit totals for one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryTotals {
    pub credits: Decimal,
    pub debits: Decimal,
}

impl EntryTotals {
    /// Fold ledger entries into totals. Callers pass only one account's
    /// entries.
    pub fn fold<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        entries
            .into_iter()
            .fold(Self::default(), |mut totals, entry| {
                match entry.entry_type {
                    EntryType::Credit => totals.credits += entry.amount.value(),
                    EntryType::Debit => totals.debits += entry.amount.value(),
                }
                totals
            })
    }

    pub fn balance(&self) -> Balance {
        Balance::from_decimal(self.credits - self.debits)
    }
}

/// Derives balances through a store or unit of work
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Balance as seen from inside `unit`.
    ///
    /// When the unit holds the account's exclusive lock this is the
    /// figure a funds check must use: every debit committed before the
    /// hold was granted is included, and no other debit can land until
    /// the unit finishes.
    pub async fn within<U: UnitOfWork>(unit: &mut U, account_id: Uuid) -> StoreResult<Balance> {
        Ok(unit.entry_totals(account_id).await?.balance())
    }

    /// Balance over committed entries only
    pub async fn committed<S: LedgerStore>(store: &S, account_id: Uuid) -> StoreResult<Balance> {
        Ok(store.entry_totals(account_id).await?.balance())
    }
}
