//! Account Handler
//!
//! Opens ledger accounts. Accounts start with no entries, so their derived
//! balance is zero.

use crate::domain::{Account, Currency, DomainError, OperationContext};
use crate::error::AppResult;
use crate::store::LedgerStore;

use super::CreateAccountCommand;

pub struct CreateAccountHandler<S> {
    store: S,
}

impl<S: LedgerStore> CreateAccountHandler<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        command: CreateAccountCommand,
        context: &OperationContext,
    ) -> AppResult<Account> {
        let account_type = command.account_type.trim();
        if account_type.is_empty() {
            return Err(DomainError::MissingField("account_type").into());
        }
        if command.currency.trim().is_empty() {
            return Err(DomainError::MissingField("currency").into());
        }
        let currency: Currency = command.currency.parse().map_err(DomainError::from)?;

        let account = Account::new(command.user_id, account_type, currency);
        self.store.insert_account(&account).await?;

        tracing::info!(
            account_id = %account.id,
            user_id = %account.user_id,
            currency = %account.currency,
            correlation_id = ?context.correlation_id,
            "Account created"
        );

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_account_normalizes_currency() {
        let store = MemoryLedgerStore::new();
        let handler = CreateAccountHandler::new(store.clone());

        let account = handler
            .execute(
                CreateAccountCommand::new(Uuid::new_v4(), "savings", "eur"),
                &OperationContext::new(),
            )
            .await
            .unwrap();

        assert_eq!(account.currency.as_str(), "EUR");
        assert_eq!(account.account_type, "savings");
        assert!(store.find_account(account.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_account_rejects_blank_fields() {
        let handler = CreateAccountHandler::new(MemoryLedgerStore::new());
        let context = OperationContext::new();

        let err = handler
            .execute(CreateAccountCommand::new(Uuid::new_v4(), "  ", "USD"), &context)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Domain(DomainError::MissingField("account_type"))
        ));

        let err = handler
            .execute(CreateAccountCommand::new(Uuid::new_v4(), "checking", "DOLLARS"), &context)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Domain(DomainError::InvalidCurrency(_))
        ));
    }
}
