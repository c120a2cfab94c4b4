//! Withdraw Handler
//!
//! Debits an account after checking its balance. The balance is read only
//! once the account's exclusive hold is taken, and the hold lasts until
//! the unit commits or rolls back, so two withdrawals against the same
//! account cannot both pass the check on the same funds.

use uuid::Uuid;

use crate::domain::{Amount, Currency, DomainError, OperationContext};
use crate::error::AppResult;
use crate::ledger::{BalanceCalculator, LedgerWriter, TransactionDraft};
use crate::store::{LedgerStore, UnitOfWork};

use super::{ensure_currency, settle, validate_movement, TransactionReceipt, WithdrawCommand};

pub struct WithdrawHandler<S> {
    store: S,
}

impl<S: LedgerStore> WithdrawHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        command: WithdrawCommand,
        context: &OperationContext,
    ) -> AppResult<TransactionReceipt> {
        let (amount, currency) = validate_movement(command.amount, &command.currency)?;

        let mut unit = self.store.begin().await?;
        let outcome = Self::withdraw(
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
            "Withdrawal completed"
        );

        Ok(receipt)
    }

    async fn withdraw(
        unit: &mut S::Unit,
        account_id: Uuid,
        amount: Amount,
        currency: Currency,
        description: Option<String>,
    ) -> AppResult<TransactionReceipt> {
        let account = unit
            .lock_account(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;
        ensure_currency(&account, &currency)?;

        let balance = BalanceCalculator::within(unit, account_id).await?;
        if !balance.is_sufficient_for(&amount) {
            return Err(
                DomainError::insufficient_funds(account_id, amount.value(), balance.value()).into(),
            );
        }

        let written = LedgerWriter::record(
            unit,
            TransactionDraft::withdrawal(account_id, amount, currency, description),
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
