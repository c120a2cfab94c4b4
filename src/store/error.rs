//! Store Errors
//!
//! Infrastructure failures raised by a ledger store. Any of these aborts
//! the unit of work it happened in.

/// Postgres SQLSTATE codes treated as constraint violations
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const APPEND_ONLY_VIOLATION: &str = "P0001";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Referential, uniqueness or check constraint rejected a write
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A persisted row could not be mapped back into a domain record
    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },

    /// Store could not be reached or refused the unit of work
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn corrupt(table: &'static str, reason: impl ToString) -> Self {
        Self::Corrupt {
            table,
            reason: reason.to_string(),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code().map(|c| c.into_owned()));

        match code.as_deref() {
            Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION | CHECK_VIOLATION | APPEND_ONLY_VIOLATION) => {
                StoreError::Constraint(err.to_string())
            }
            _ => match err {
                sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                    StoreError::Unavailable(err.to_string())
                }
                other => StoreError::Database(other),
            },
        }
    }
}
