//! Account Locking Policy
//!
//! Any unit that reads a balance to authorize a debit holds that account
//! exclusively until it commits or rolls back. Units that touch two
//! accounts acquire both holds in ascending id order, whichever side is
//! the source, so two transfers running in opposite directions between the
//! same pair cannot deadlock. Credits need no hold.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::Account;
use crate::store::{StoreResult, UnitOfWork};

/// Order in which two accounts must be locked
pub fn lock_order(a: Uuid, b: Uuid) -> [Uuid; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

/// Hold both sides of a transfer in ascending id order.
///
/// Results come back as `(source, destination)` regardless of the order
/// the holds were taken in.
pub async fn lock_pair<U: UnitOfWork>(
    unit: &mut U,
    source: Uuid,
    destination: Uuid,
) -> StoreResult<(Option<Account>, Option<Account>)> {
    let [first, second] = lock_order(source, destination);

    let first_account = unit.lock_account(first).await?;
    let second_account = unit.lock_account(second).await?;

    if first == source {
        Ok((first_account, second_account))
    } else {
        Ok((second_account, first_account))
    }
}

// =========================================================================
// In-process holds
// =========================================================================

/// Exclusive holds keyed by account id, for stores without row locks.
///
/// Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct AccountLocks {
    slots: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

/// Held until dropped
#[derive(Debug)]
pub struct AccountHold {
    account_id: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl AccountHold {
    pub fn account_id(&self) -> Uuid {
        self.account_id
    }
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `account_id`, dropping slots nobody holds or waits on.
    ///
    /// A slot referenced only by the registry has no holder and no waiter,
    /// since both keep their own `Arc` until they are done.
    fn slot(&self, account_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(account_id).or_default().clone()
    }

    /// Wait for and take the hold on `account_id`
    pub async fn acquire(&self, account_id: Uuid) -> AccountHold {
        let slot = self.slot(account_id);

        AccountHold {
            account_id,
            _guard: slot.lock_owned().await,
        }
    }

    /// Take the hold only if nobody else has it
    #[cfg(test)]
    pub fn try_acquire(&self, account_id: Uuid) -> Option<AccountHold> {
        self.slot(account_id)
            .try_lock_owned()
            .ok()
            .map(|guard| AccountHold {
                account_id,
                _guard: guard,
            })
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
