//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    AccountWithBalance, Amount, DomainError, EntryType, LedgerEntry, OperationContext, Transaction,
};
use crate::error::{AppError, AppResult};
use crate::handlers::{
    AccountQueries, CreateAccountCommand, CreateAccountHandler, DepositCommand, DepositHandler,
    TransactionReceipt, TransferCommand, TransferHandler, WithdrawCommand, WithdrawHandler,
};
use crate::store::LedgerStore;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: Option<Uuid>,
    pub account_type: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub account_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub account_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub source_account: Option<Uuid>,
    pub destination_account: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub message: String,
    pub transaction_id: Uuid,
}

impl From<TransactionReceipt> for ReceiptResponse {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            message: receipt.message().to_string(),
            transaction_id: receipt.transaction_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub account_id: Uuid,
    pub entries: Vec<LedgerEntryResponse>,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            transaction_id: entry.transaction_id,
            entry_type: entry.entry_type,
            amount: entry.amount,
            created_at: entry.created_at,
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> AppResult<T> {
    value.ok_or_else(|| DomainError::MissingField(field).into())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router over any ledger store
pub fn create_router<S>() -> Router<S>
where
    S: LedgerStore + Clone,
{
    Router::new()
        .route("/accounts", post(create_account::<S>))
        .route("/accounts/:account_id", get(get_account::<S>))
        .route("/accounts/:account_id/ledger", get(get_ledger::<S>))
        .route("/deposits", post(deposit::<S>))
        .route("/withdrawals", post(withdraw::<S>))
        .route("/transfers", post(transfer::<S>))
        .route("/transactions/:transaction_id", get(get_transaction::<S>))
        .route("/health", get(health_check::<S>))
}

// =========================================================================
// Accounts
// =========================================================================

async fn create_account<S: LedgerStore + Clone>(
    State(store): State<S>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<crate::domain::Account>)> {
    let request = body(payload)?;
    let command = CreateAccountCommand::new(
        required(request.user_id, "user_id")?,
        required(request.account_type, "account_type")?,
        required(request.currency, "currency")?,
    );

    let account = CreateAccountHandler::new(store)
        .execute(command, &context)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Account with its balance derived from committed entries
async fn get_account<S: LedgerStore + Clone>(
    State(store): State<S>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<AccountWithBalance>> {
    let account_id = path_id(path)?;
    let view = AccountQueries::new(store)
        .account_with_balance(account_id)
        .await?;
    Ok(Json(view))
}

async fn get_ledger<S: LedgerStore + Clone>(
    State(store): State<S>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<LedgerResponse>> {
    let account_id = path_id(path)?;
    let entries = AccountQueries::new(store).ledger(account_id).await?;

    Ok(Json(LedgerResponse {
        account_id,
        entries: entries.into_iter().map(LedgerEntryResponse::from).collect(),
    }))
}

// =========================================================================
// Money movements
// =========================================================================

async fn deposit<S: LedgerStore + Clone>(
    State(store): State<S>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReceiptResponse>)> {
    let request = body(payload)?;
    let command = DepositCommand {
        account_id: required(request.account_id, "account_id")?,
        amount: required(request.amount, "amount")?,
        currency: required(request.currency, "currency")?,
        description: request.description,
    };

    let receipt = DepositHandler::new(store).execute(command, &context).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

async fn withdraw<S: LedgerStore + Clone>(
    State(store): State<S>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<WithdrawRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReceiptResponse>)> {
    let request = body(payload)?;
    let command = WithdrawCommand {
        account_id: required(request.account_id, "account_id")?,
        amount: required(request.amount, "amount")?,
        currency: required(request.currency, "currency")?,
        description: request.description,
    };

    let receipt = WithdrawHandler::new(store).execute(command, &context).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

async fn transfer<S: LedgerStore + Clone>(
    State(store): State<S>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReceiptResponse>)> {
    let request = body(payload)?;
    let command = TransferCommand {
        source_account: required(request.source_account, "source_account")?,
        destination_account: required(request.destination_account, "destination_account")?,
        amount: required(request.amount, "amount")?,
        currency: required(request.currency, "currency")?,
        description: request.description,
    };

    let receipt = TransferHandler::new(store).execute(command, &context).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

async fn get_transaction<S: LedgerStore + Clone>(
    State(store): State<S>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Transaction>> {
    let transaction_id = path_id(path)?;
    let transaction = AccountQueries::new(store).transaction(transaction_id).await?;
    Ok(Json(transaction))
}

// =========================================================================
// Health
// =========================================================================

async fn health_check<S: LedgerStore + Clone>(State(store): State<S>) -> AppResult<&'static str> {
    store.ping().await?;
    Ok("OK")
}
