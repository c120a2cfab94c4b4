//! PostgreSQL ledger store.
//!
//! Each unit of work is one database transaction at the default READ
//! COMMITTED level. Exclusive account holds are row locks taken with
//! `FOR NO KEY UPDATE`: that blocks other debits on the account but not
//! the `FOR KEY SHARE` lock a concurrent deposit's foreign-key check
//! needs, so credits keep flowing while a withdrawal is deciding. Every
//! statement after the lock reads a fresh snapshot, so the balance query
//! sees all debits committed before the lock was granted.
//!
//! An uncommitted `sqlx::Transaction` rolls back when dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgExecutor;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::{Account, Amount, LedgerEntry, Transaction, TransactionStatus};
use crate::ledger::EntryTotals;

use super::{LedgerStore, StoreError, StoreResult, UnitOfWork};

const SELECT_ACCOUNT: &str = r#"
    SELECT id, user_id, account_type, currency, created_at
    FROM accounts
    WHERE id = $1
"#;

const LOCK_ACCOUNT: &str = r#"
    SELECT id, user_id, account_type, currency, created_at
    FROM accounts
    WHERE id = $1
    FOR NO KEY UPDATE
"#;

const ENTRY_TOTALS: &str = r#"
    SELECT
        COALESCE(SUM(amount) FILTER (WHERE entry_type = 'credit'), 0) AS credits,
        COALESCE(SUM(amount) FILTER (WHERE entry_type = 'debit'), 0) AS debits
    FROM ledger_entries
    WHERE account_id = $1
"#;

type AccountRow = (Uuid, Uuid, String, String, DateTime<Utc>);

type TransactionRow = (
    Uuid,
    String,
    Option<Uuid>,
    Option<Uuid>,
    Decimal,
    String,
    String,
    Option<String>,
    DateTime<Utc>,
);

type EntryRow = (Uuid, Uuid, Uuid, String, Decimal, DateTime<Utc>);

fn account_from_row(row: AccountRow) -> StoreResult<Account> {
    let (id, user_id, account_type, currency, created_at) = row;
    Ok(Account {
        id,
        user_id,
        account_type,
        currency: currency
            .parse()
            .map_err(|e| StoreError::corrupt("accounts", e))?,
        created_at,
    })
}

fn transaction_from_row(row: TransactionRow) -> StoreResult<Transaction> {
    let (id, kind, source, destination, amount, currency, status, description, created_at) = row;
    Ok(Transaction {
        id,
        transaction_type: kind
            .parse()
            .map_err(|e| StoreError::corrupt("transactions", e))?,
        source_account: source,
        destination_account: destination,
        amount: Amount::new(amount).map_err(|e| StoreError::corrupt("transactions", e))?,
        currency: currency
            .parse()
            .map_err(|e| StoreError::corrupt("transactions", e))?,
        status: status
            .parse()
            .map_err(|e| StoreError::corrupt("transactions", e))?,
        description,
        created_at,
    })
}

fn entry_from_row(row: EntryRow) -> StoreResult<LedgerEntry> {
    let (id, account_id, transaction_id, entry_type, amount, created_at) = row;
    Ok(LedgerEntry {
        id,
        account_id,
        transaction_id,
        entry_type: entry_type
            .parse()
            .map_err(|e| StoreError::corrupt("ledger_entries", e))?,
        amount: Amount::new(amount).map_err(|e| StoreError::corrupt("ledger_entries", e))?,
        created_at,
    })
}

async fn fetch_account<'e, E: PgExecutor<'e>>(
    executor: E,
    sql: &'static str,
    account_id: Uuid,
) -> StoreResult<Option<Account>> {
    let row: Option<AccountRow> = sqlx::query_as(sql)
        .bind(account_id)
        .fetch_optional(executor)
        .await?;

    row.map(account_from_row).transpose()
}

async fn fetch_entry_totals<'e, E: PgExecutor<'e>>(
    executor: E,
    account_id: Uuid,
) -> StoreResult<EntryTotals> {
    let (credits, debits): (Decimal, Decimal) = sqlx::query_as(ENTRY_TOTALS)
        .bind(account_id)
        .fetch_one(executor)
        .await?;

    Ok(EntryTotals { credits, debits })
}

/// Ledger store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Unit = PgUnit;

    async fn begin(&self) -> StoreResult<PgUnit> {
        Ok(PgUnit {
            tx: self.pool.begin().await?,
        })
    }

    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, user_id, account_type, currency, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id)
        .bind(account.user_id)
        .bind(&account.account_type)
        .bind(account.currency.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_account(&self, account_id: Uuid) -> StoreResult<Option<Account>> {
        fetch_account(&self.pool, SELECT_ACCOUNT, account_id).await
    }

    async fn entry_totals(&self, account_id: Uuid) -> StoreResult<EntryTotals> {
        fetch_entry_totals(&self.pool, account_id).await
    }

    async fn ledger_entries(&self, account_id: Uuid) -> StoreResult<Vec<LedgerEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, transaction_id, entry_type, amount, created_at
            FROM ledger_entries
            WHERE account_id = $1
            ORDER BY created_at ASC, entry_seq ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(entry_from_row).collect()
    }

    async fn find_transaction(&self, transaction_id: Uuid) -> StoreResult<Option<Transaction>> {
        let row: Option<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, type, source_account, destination_account, amount,
                   currency, status, description, created_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(transaction_from_row).transpose()
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::verify_connection(&self.pool).await?;
        Ok(())
    }
}

/// Unit of work over one PostgreSQL transaction
pub struct PgUnit {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnit {
    async fn find_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>> {
        fetch_account(&mut *self.tx, SELECT_ACCOUNT, account_id).await
    }

    async fn lock_account(&mut self, account_id: Uuid) -> StoreResult<Option<Account>> {
        fetch_account(&mut *self.tx, LOCK_ACCOUNT, account_id).await
    }

    async fn entry_totals(&mut self, account_id: Uuid) -> StoreResult<EntryTotals> {
        fetch_entry_totals(&mut *self.tx, account_id).await
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, type, source_account, destination_account, amount,
                currency, status, description, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.source_account)
        .bind(transaction.destination_account)
        .bind(transaction.amount.value())
        .bind(transaction.currency.as_str())
        .bind(transaction.status.as_str())
        .bind(&transaction.description)
        .bind(transaction.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn insert_entry(&mut self, entry: &LedgerEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (id, account_id, transaction_id, entry_type, amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.account_id)
        .bind(entry.transaction_id)
        .bind(entry.entry_type.as_str())
        .bind(entry.amount.value())
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn set_transaction_status(
        &mut self,
        transaction_id: Uuid,
        status: TransactionStatus,
    ) -> StoreResult<()> {
        let rows_affected = sqlx::query("UPDATE transactions SET status = $2 WHERE id = $1")
            .bind(transaction_id)
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        if rows_affected != 1 {
            return Err(StoreError::Constraint(format!(
                "transaction {transaction_id} not found for status update"
            )));
        }

        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
