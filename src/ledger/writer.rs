//! Ledger Writer
//!
//! Appends a transaction and its entries through a unit of work:
//! the transaction row goes in as `pending`, the entries follow, and the
//! row is flipped to `completed`. All three steps share the caller's unit,
//! so either all of them commit or none do. Funds checks happen before the
//! writer is called; it never reads balances.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Amount, Currency, EntryType, LedgerEntry, Transaction, TransactionStatus, TransactionType,
};
use crate::store::{StoreResult, UnitOfWork};

/// A money movement ready to be written.
///
/// Constructed per transaction type so the account references always match
/// the type: a deposit has only a destination, a withdrawal only a source,
/// a transfer both.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    transaction_type: TransactionType,
    source: Option<Uuid>,
    destination: Option<Uuid>,
    amount: Amount,
    currency: Currency,
    description: Option<String>,
}

impl TransactionDraft {
    pub fn deposit(
        destination: Uuid,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
    ) -> Self {
        Self {
            transaction_type: TransactionType::Deposit,
            source: None,
            destination: Some(destination),
            amount,
            currency,
            description,
        }
    }

    pub fn withdrawal(
        source: Uuid,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
    ) -> Self {
        Self {
            transaction_type: TransactionType::Withdrawal,
            source: Some(source),
            destination: None,
            amount,
            currency,
            description,
        }
    }

    pub fn transfer(
        source: Uuid,
        destination: Uuid,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
    ) -> Self {
        Self {
            transaction_type: TransactionType::Transfer,
            source: Some(source),
            destination: Some(destination),
            amount,
            currency,
            description,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// Entries this draft produces: a debit on the source, a credit on the
    /// destination, debit first.
    pub fn postings(&self) -> Vec<(Uuid, EntryType)> {
        self.source
            .map(|id| (id, EntryType::Debit))
            .into_iter()
            .chain(self.destination.map(|id| (id, EntryType::Credit)))
            .collect()
    }
}

/// What the writer appended
#[derive(Debug, Clone)]
pub struct WrittenTransaction {
    pub transaction: Transaction,
    pub entries: Vec<LedgerEntry>,
}

pub struct LedgerWriter;

impl LedgerWriter {
    /// Write `draft` through `unit` and mark it completed.
    ///
    /// Nothing is visible to other readers until the unit commits.
    pub async fn record<U: UnitOfWork>(
        unit: &mut U,
        draft: TransactionDraft,
    ) -> StoreResult<WrittenTransaction> {
        let postings = draft.postings();
        let now = Utc::now();

        let mut transaction = Transaction {
            id: Uuid::new_v4(),
            transaction_type: draft.transaction_type,
            source_account: draft.source,
            destination_account: draft.destination,
            amount: draft.amount,
            currency: draft.currency,
            status: TransactionStatus::Pending,
            description: draft.description,
            created_at: now,
        };
        unit.insert_transaction(&transaction).await?;

        let mut entries = Vec::with_capacity(postings.len());
        for (account_id, entry_type) in postings {
            let entry = LedgerEntry {
                id: Uuid::new_v4(),
                account_id,
                transaction_id: transaction.id,
                entry_type,
                amount: transaction.amount,
                created_at: now,
            };
            unit.insert_entry(&entry).await?;
            entries.push(entry);
        }

        unit.set_transaction_status(transaction.id, TransactionStatus::Completed)
            .await?;
        transaction.status = TransactionStatus::Completed;

        tracing::debug!(
            transaction_id = %transaction.id,
            transaction_type = %transaction.transaction_type,
            entries = entries.len(),
            "Ledger entries written"
        );

        Ok(WrittenTransaction {
            transaction,
            entries,
        })
    }
}
