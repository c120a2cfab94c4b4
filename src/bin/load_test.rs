//! Load Testing Tool
//!
//! Fires concurrent withdrawals and transfers at a small set of accounts,
//! then checks that no balance went negative and that the books balance.
//!
//! Run with: cargo run --bin load_test --release -- --accounts 8 --operations 2000
//!
//! Uses PostgreSQL when DATABASE_URL is set, otherwise the in-process store.

use std::time::Instant;

use rust_decimal::Decimal;
use tokio::task::JoinSet;
use uuid::Uuid;

use ledger_core::handlers::{
    AccountQueries, CreateAccountCommand, CreateAccountHandler, DepositCommand, DepositHandler,
    TransferCommand, TransferHandler, WithdrawCommand, WithdrawHandler,
};
use ledger_core::{db, Config, LedgerStore, MemoryLedgerStore, OperationContext, PgLedgerStore};

const OPENING_DEPOSIT: i64 = 1_000;

#[derive(Debug, Default)]
struct Tally {
    succeeded: u64,
    rejected: u64,
    failed: u64,
    withdrawn: Decimal,
}

fn arg(args: &[String], name: &str, default: usize) -> usize {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let account_count = arg(&args, "--accounts", 8).max(2);
    let operations = arg(&args, "--operations", 2000);

    let config = Config::from_env()?;
    match config.database_url.clone() {
        Some(url) => {
            println!("Connecting to database...");
            let pool = db::connect(&config, &url).await?;
            run(PgLedgerStore::new(pool), account_count, operations).await
        }
        None => {
            println!("DATABASE_URL not set, using the in-process store");
            run(MemoryLedgerStore::new(), account_count, operations).await
        }
    }
}

async fn run<S: LedgerStore + Clone>(
    store: S,
    account_count: usize,
    operations: usize,
) -> anyhow::Result<()> {
    let context = OperationContext::new();
    let opening = Decimal::from(OPENING_DEPOSIT);

    let mut accounts = Vec::with_capacity(account_count);
    for _ in 0..account_count {
        let account = CreateAccountHandler::new(store.clone())
            .execute(
                CreateAccountCommand::new(Uuid::new_v4(), "checking", "USD"),
                &context,
            )
            .await?;
        DepositHandler::new(store.clone())
            .execute(DepositCommand::new(account.id, opening, "USD"), &context)
            .await?;
        accounts.push(account.id);
    }

    println!(
        "Load Test - {} operations across {} accounts",
        operations, account_count
    );

    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for i in 0..operations {
        let store = store.clone();
        let source = accounts[i % account_count];
        let destination = accounts[(i * 7 + 1) % account_count];
        // Amounts cycle 1..=97 so accounts drain unevenly
        let amount = Decimal::from((i % 97 + 1) as i64);

        tasks.spawn(async move {
            let context = OperationContext::new().with_correlation_id(Uuid::new_v4());
            if i % 3 == 0 || source == destination {
                let result = WithdrawHandler::new(store)
                    .execute(WithdrawCommand::new(source, amount, "USD"), &context)
                    .await;
                (result, Some(amount))
            } else {
                let result = TransferHandler::new(store)
                    .execute(
                        TransferCommand::new(source, destination, amount, "USD"),
                        &context,
                    )
                    .await;
                (result, None)
            }
        });
    }

    let mut tally = Tally::default();
    while let Some(joined) = tasks.join_next().await {
        let (result, withdrawn) = joined?;
        match result {
            Ok(_) => {
                tally.succeeded += 1;
                if let Some(amount) = withdrawn {
                    tally.withdrawn += amount;
                }
            }
            Err(e) if e.is_insufficient_funds() => tally.rejected += 1,
            Err(e) => {
                tally.failed += 1;
                eprintln!("Operation failed: {}", e);
            }
        }
    }

    let elapsed = start.elapsed();
    let rate = operations as f64 / elapsed.as_secs_f64();

    let queries = AccountQueries::new(store);
    let mut total = Decimal::ZERO;
    let mut negative = 0;
    for &id in &accounts {
        let balance = queries.account_with_balance(id).await?.balance;
        if balance.is_negative() {
            negative += 1;
        }
        total += balance.value();
    }
    let expected = opening * Decimal::from(account_count as i64) - tally.withdrawn;

    println!("\n=== Load Test Results ===");
    println!("Operations: {}", operations);
    println!("Succeeded: {}", tally.succeeded);
    println!("Rejected (insufficient funds): {}", tally.rejected);
    println!("Failed: {}", tally.failed);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} ops/sec", rate);
    println!("Total balance: {} (expected {})", total, expected);

    if negative > 0 {
        anyhow::bail!("{} account(s) ended with a negative balance", negative);
    }
    if total != expected {
        anyhow::bail!("books do not balance: {} != {}", total, expected);
    }

    println!("Invariant holds");
    Ok(())
}
