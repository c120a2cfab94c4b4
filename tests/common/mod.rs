//! Common test utilities

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use ledger_core::{db, Config, PgLedgerStore};

/// Connect to DATABASE_URL and bring the schema up to date.
///
/// Tests create their own accounts, so no cleanup is needed between them.
pub async fn setup_pg_store() -> PgLedgerStore {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Invalid test configuration");
    let database_url = config
        .database_url
        .clone()
        .expect("DATABASE_URL must be set for tests");

    let pool = db::connect(&config, &database_url)
        .await
        .expect("Failed to connect to DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    assert!(db::check_schema(&pool).await.expect("Schema check failed"));

    PgLedgerStore::new(pool)
}

/// Send one request through the app and decode the JSON body, if any
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal fields are serialized as strings")
        .parse()
        .unwrap()
}

pub fn uuid(value: &Value) -> Uuid {
    value.as_str().unwrap().parse().unwrap()
}
