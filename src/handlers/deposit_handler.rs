//! Deposit Handler
//!
//! Credits come from outside the ledger and need no funds check, so a
//! deposit never takes an exclusive hold on its account.

use uuid::Uuid;

use crate::domain::{Amount, Currency, DomainError, OperationContext};
use crate::error::AppResult;
use crate::ledger::{LedgerWriter, TransactionDraft};
use crate::store::{LedgerStore, UnitOfWork};

use super::{ensure_currency, settle, validate_movement, DepositCommand, TransactionReceipt};

pub struct DepositHandler<S> {
    store: S,
}

impl<S: LedgerStore> DepositHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        command: DepositCommand,
        context: &OperationContext,
    ) -> AppResult<TransactionReceipt> {
        let (amount, currency) = validate_movement(command.amount, &command.currency)?;

        let mut unit = self.store.begin().await?;
        let outcome = Self::deposit(
            &mut unit,
            command.account_id,
            amount,
            currency,
            command.description,
        )
        .await;
        let receipt = settle(unit, outcome).await?;

        tracing::info!(
            transaction_id = %receipt.transaction_id,
            account_id = %command.account_id,
            amount = %receipt.amount,
            correlation_id = ?context.correlation_id,
            "Deposit completed"
        );

        Ok(receipt)
    }

    async fn deposit(
        unit: &mut S::Unit,
        account_id: Uuid,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
    ) -> AppResult<TransactionReceipt> {
        let account = unit
            .find_account(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;
        ensure_currency(&account, &currency)?;

        let written = LedgerWriter::record(
            unit,
            TransactionDraft::deposit(account_id, amount, currency, description),
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
