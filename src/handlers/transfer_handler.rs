//! Transfer Handler
//!
//! Moves funds between two accounts as one transaction with a debit entry
//! on the source and a credit entry on the destination.

use uuid::Uuid;

use crate::domain::{Amount, Currency, DomainError, OperationContext};
use crate::error::AppResult;
use crate::ledger::locking::lock_pair;
use crate::ledger::{BalanceCalculator, LedgerWriter, TransactionDraft};
use crate::store::LedgerStore;

use super::{ensure_currency, settle, validate_movement, TransactionReceipt, TransferCommand};

pub struct TransferHandler<S> {
    store: S,
}

impl<S: LedgerStore> TransferHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> AppResult<TransactionReceipt> {
        if command.source_account == command.destination_account {
            return Err(DomainError::SameAccountTransfer.into());
        }
        let (amount, currency) = validate_movement(command.amount, &command.currency)?;

        let mut unit = self.store.begin().await?;
        let outcome = Self::transfer(
            &mut unit,
            command.source_account,
            command.destination_account,
            amount,
            currency,
            command.description,
        )
        .await;
        let receipt = settle(unit, outcome).await?;

        tracing::info!(
            transaction_id = %receipt.transaction_id,
            source_account = %command.source_account,
            destination_account = %command.destination_account,
            amount = %receipt.amount,
            correlation_id = ?context.correlation_id,
            "Transfer completed"
        );

        Ok(receipt)
    }

    async fn transfer(
        unit: &mut S::Unit,
        source_id: Uuid,
        destination_id: Uuid,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
    ) -> AppResult<TransactionReceipt> {
        // Both holds are taken in id order before either balance is read
        let (source, destination) = lock_pair(unit, source_id, destination_id).await?;
        let source = source.ok_or(DomainError::AccountNotFound(source_id))?;
        let destination = destination.ok_or(DomainError::AccountNotFound(destination_id))?;
        ensure_currency(&source, &currency)?;
        ensure_currency(&destination, &currency)?;

        let balance = BalanceCalculator::within(unit, source_id).await?;
        if !balance.is_sufficient_for(&amount) {
            return Err(
                DomainError::insufficient_funds(source_id, amount.value(), balance.value()).into(),
            );
        }

        let written = LedgerWriter::record(
            unit,
            TransactionDraft::transfer(source_id, destination_id, amount, currency, description),
        )
        .await?;

        Ok(TransactionReceipt {
            transaction_id: written.transaction.id,
            transaction_type: written.transaction.transaction_type,
            status: written.transaction.status,
            amount,
        })
    }
}
