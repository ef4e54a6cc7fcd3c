use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::mysql::{MySqlDatabaseError, MySqlRow};
use sqlx::FromRow;
use thiserror::Error;

use crate::utils::db_utils::{
    Insert, PartialUpdate, ProcedureCall, Select, SqlValue, application_error_code,
    clean_procedure_message, is_application_error,
};

#[cfg(test)]
pub mod memory;

/// Anything the store can hand back as a row.
pub trait Record: for<'r> FromRow<'r, MySqlRow> + DeserializeOwned + Send + Unpin + 'static {}

impl<T> Record for T where
    T: for<'r> FromRow<'r, MySqlRow> + DeserializeOwned + Send + Unpin + 'static
{
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for a unique key: {0}")]
    Duplicate(String),

    /// Business rule violation signalled by a stored procedure.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(db_err) = &err else {
            return StoreError::Database(err);
        };

        if db_err.is_unique_violation() {
            return StoreError::Duplicate(db_err.message().to_string());
        }

        let signalled = db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|e| is_application_error(u32::from(e.number())));

        if signalled || application_error_code(db_err.message()).is_some() {
            return StoreError::Rejected(clean_procedure_message(db_err.message()));
        }

        StoreError::Database(err)
    }
}

/// Single-statement, autocommit access to the relational store.
///
/// Every call borrows one pooled connection for its duration; the connection
/// goes back to the pool on every exit path.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn select_one<T: Record>(
        &self,
        select: &Select,
        value: &SqlValue,
    ) -> Result<Option<T>, StoreError>;

    async fn select_all<T: Record>(&self, select: &Select) -> Result<Vec<T>, StoreError>;

    /// Returns the generated key, or 0 when the row carried its own key.
    async fn insert(&self, insert: &Insert) -> Result<u64, StoreError>;

    async fn call(&self, call: &ProcedureCall) -> Result<(), StoreError>;

    /// Returns the number of rows affected.
    async fn update(&self, update: &PartialUpdate) -> Result<u64, StoreError>;

    async fn delete(
        &self,
        table: &'static str,
        key_column: &'static str,
        key: &SqlValue,
    ) -> Result<u64, StoreError>;

    async fn delete_all(&self, table: &'static str) -> Result<u64, StoreError>;
}
