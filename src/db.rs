use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlPoolOptions};
use sqlx::query::{Query, QueryAs};
use tracing::debug;

use crate::config::Config;
use crate::store::{Record, Store, StoreError};
use crate::utils::db_utils::{Insert, PartialUpdate, ProcedureCall, Select, SqlStatement, SqlValue};

pub async fn init_db(config: &Config) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
}

fn bind<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::String(v) => query.bind(v),
        SqlValue::U64(v) => query.bind(v),
        SqlValue::F64(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::Null => query.bind(None::<String>),
    }
}

fn bind_as<'q, O>(
    query: QueryAs<'q, MySql, O, MySqlArguments>,
    value: SqlValue,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    match value {
        SqlValue::String(v) => query.bind(v),
        SqlValue::U64(v) => query.bind(v),
        SqlValue::F64(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::Null => query.bind(None::<String>),
    }
}

/// `Store` backed by a MySQL connection pool running in autocommit mode.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn execute(&self, stmt: SqlStatement) -> Result<sqlx::mysql::MySqlQueryResult, StoreError> {
        debug!(sql = %stmt.sql, bindings = ?stmt.values, "Executing statement");

        let mut query = sqlx::query(&stmt.sql);
        for value in stmt.values {
            query = bind(query, value);
        }

        Ok(query.execute(&self.pool).await?)
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn select_one<T: Record>(
        &self,
        select: &Select,
        value: &SqlValue,
    ) -> Result<Option<T>, StoreError> {
        let sql = select.to_sql();
        debug!(sql = %sql, binding = ?value, "Fetching row");

        let query = bind_as(sqlx::query_as::<_, T>(&sql), value.clone());
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn select_all<T: Record>(&self, select: &Select) -> Result<Vec<T>, StoreError> {
        let sql = select.to_sql();
        debug!(sql = %sql, "Fetching rows");

        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert(&self, insert: &Insert) -> Result<u64, StoreError> {
        let result = self.execute(insert.to_sql()).await?;
        Ok(insert
            .generated_key
            .map(|_| result.last_insert_id())
            .unwrap_or_default())
    }

    async fn call(&self, call: &ProcedureCall) -> Result<(), StoreError> {
        self.execute(call.to_sql()).await?;
        Ok(())
    }

    async fn update(&self, update: &PartialUpdate) -> Result<u64, StoreError> {
        if update.assignments.is_empty() {
            return Ok(0);
        }
        let result = self.execute(update.to_sql()).await?;
        Ok(result.rows_affected())
    }

    async fn delete(
        &self,
        table: &'static str,
        key_column: &'static str,
        key: &SqlValue,
    ) -> Result<u64, StoreError> {
        let stmt = SqlStatement {
            sql: format!("DELETE FROM {} WHERE {} = ?", table, key_column),
            values: vec![key.clone()],
        };
        Ok(self.execute(stmt).await?.rows_affected())
    }

    async fn delete_all(&self, table: &'static str) -> Result<u64, StoreError> {
        let stmt = SqlStatement {
            sql: format!("DELETE FROM {}", table),
            values: Vec::new(),
        };
        Ok(self.execute(stmt).await?.rows_affected())
    }
}
