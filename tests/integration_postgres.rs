//! PostgreSQL Integration Tests
//!
//! Run with: DATABASE_URL=postgres://... cargo test --test integration_postgres -- --ignored

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use ledger_core::handlers::{
    AccountQueries, CreateAccountCommand, CreateAccountHandler, DepositCommand, DepositHandler,
    TransferCommand, TransferHandler, WithdrawCommand, WithdrawHandler,
};
use ledger_core::{
    EntryType, LedgerStore, OperationContext, PgLedgerStore, TransactionStatus, UnitOfWork,
};

mod common;

async fn open_account(store: &PgLedgerStore, funds: Decimal) -> Uuid {
    let context = OperationContext::new();
    let account = CreateAccountHandler::new(store.clone())
        .execute(
            CreateAccountCommand::new(Uuid::new_v4(), "checking", "USD"),
            &context,
        )
        .await
        .unwrap();
    if funds > Decimal::ZERO {
        DepositHandler::new(store.clone())
            .execute(DepositCommand::new(account.id, funds, "USD"), &context)
            .await
            .unwrap();
    }
    account.id
}

async fn balance(store: &PgLedgerStore, account_id: Uuid) -> Decimal {
    AccountQueries::new(store.clone())
        .account_with_balance(account_id)
        .await
        .unwrap()
        .balance
        .value()
}

async fn transaction_rows_touching(store: &PgLedgerStore, account_id: Uuid) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM transactions WHERE source_account = $1 OR destination_account = $1",
    )
    .bind(account_id)
    .fetch_one(store.pool())
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_transfer_writes_balanced_entries() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, dec!(100)).await;
    let b = open_account(&store, Decimal::ZERO).await;

    let receipt = TransferHandler::new(store.clone())
        .execute(
            TransferCommand::new(a, b, dec!(40.5), "USD").with_description("rent"),
            &OperationContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(balance(&store, a).await, dec!(59.5));
    assert_eq!(balance(&store, b).await, dec!(40.5));

    let transaction = store
        .find_transaction(receipt.transaction_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(transaction.status, TransactionStatus::Completed);
    assert_eq!(transaction.description.as_deref(), Some("rent"));

    let entries = store.ledger_entries(a).await.unwrap();
    let kinds: Vec<EntryType> = entries.iter().map(|e| e.entry_type).collect();
    assert_eq!(kinds, vec![EntryType::Credit, EntryType::Debit]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_insufficient_funds_leaves_no_rows() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, dec!(10)).await;
    let rows_before = transaction_rows_touching(&store, a).await;

    let err = WithdrawHandler::new(store.clone())
        .execute(WithdrawCommand::new(a, dec!(10.01), "USD"), &OperationContext::new())
        .await
        .unwrap_err();

    assert!(err.is_insufficient_funds());
    assert_eq!(transaction_rows_touching(&store, a).await, rows_before);
    assert_eq!(balance(&store, a).await, dec!(10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_withdrawals_have_one_winner() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, dec!(100)).await;

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let handler = WithdrawHandler::new(store.clone());
        tasks.push(tokio::spawn(async move {
            handler
                .execute(WithdrawCommand::new(a, dec!(80), "USD"), &OperationContext::new())
                .await
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert!(e.is_insufficient_funds(), "unexpected error: {e}"),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(balance(&store, a).await, dec!(20));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn test_opposite_transfers_do_not_deadlock() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, dec!(500)).await;
    let b = open_account(&store, dec!(500)).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let handler = TransferHandler::new(store.clone());
        let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
        tasks.push(tokio::spawn(async move {
            handler
                .execute(TransferCommand::new(from, to, dec!(5), "USD"), &OperationContext::new())
                .await
        }));
    }

    let all = async {
        for task in tasks {
            task.await.unwrap().unwrap();
        }
    };
    tokio::time::timeout(Duration::from_secs(30), all)
        .await
        .expect("opposite transfers deadlocked");

    assert_eq!(balance(&store, a).await, dec!(500));
    assert_eq!(balance(&store, b).await, dec!(500));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL"]
async fn test_deposits_proceed_while_account_is_held() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, dec!(10)).await;

    // Hold the account the way a withdrawal does, without finishing
    let mut unit = store.begin().await.unwrap();
    unit.lock_account(a).await.unwrap().unwrap();

    let handler = DepositHandler::new(store.clone());
    let context = OperationContext::new();
    let deposit = handler.execute(DepositCommand::new(a, dec!(5), "USD"), &context);
    tokio::time::timeout(Duration::from_secs(5), deposit)
        .await
        .expect("deposit blocked by account hold")
        .unwrap();

    unit.rollback().await.unwrap();
    assert_eq!(balance(&store, a).await, dec!(15));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_maximum_amount_fits_the_schema() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, Decimal::ZERO).await;

    DepositHandler::new(store.clone())
        .execute(
            DepositCommand::new(a, dec!(1000000000000), "USD"),
            &OperationContext::new(),
        )
        .await
        .unwrap();
    DepositHandler::new(store.clone())
        .execute(
            DepositCommand::new(a, dec!(999999999999.99999999), "USD"),
            &OperationContext::new(),
        )
        .await
        .unwrap();

    assert_eq!(balance(&store, a).await, dec!(1999999999999.99999999));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ledger_entries_are_append_only() {
    let store = common::setup_pg_store().await;
    let a = open_account(&store, dec!(10)).await;

    let update = sqlx::query("UPDATE ledger_entries SET amount = 1 WHERE account_id = $1")
        .bind(a)
        .execute(store.pool())
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM ledger_entries WHERE account_id = $1")
        .bind(a)
        .execute(store.pool())
        .await;
    assert!(delete.is_err());

    assert_eq!(balance(&store, a).await, dec!(10));
}
