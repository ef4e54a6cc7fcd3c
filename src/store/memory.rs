//! In-process `Store` used by the handler tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{Record, Store, StoreError};
use crate::model::Resource;
use crate::model::department::Departments;
use crate::model::employee::Employees;
use crate::model::job::Jobs;
use crate::model::user::Users;
use crate::utils::db_utils::{Assignment, Insert, PartialUpdate, ProcedureCall, Select, SqlValue};

type Row = Map<String, Value>;

#[derive(Default)]
struct State {
    tables: HashMap<&'static str, Vec<Row>>,
    keys: HashMap<&'static str, &'static str>,
    unique: Vec<(&'static str, &'static str)>,
    procedures: HashMap<&'static str, &'static str>,
    next_id: u64,
    writes: usize,
    fail_next: Option<StoreError>,
}

impl State {
    fn check_unique(&self, table: &str, row: &Row, skip: Option<usize>) -> Result<(), StoreError> {
        let rows = self.tables.get(table).map(Vec::as_slice).unwrap_or_default();
        let key = self.keys.get(table).copied();
        let columns = self
            .unique
            .iter()
            .filter(|(t, _)| *t == table)
            .map(|(_, c)| *c)
            .chain(key);

        for column in columns {
            let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = rows
                .iter()
                .enumerate()
                .any(|(i, other)| Some(i) != skip && other.get(column) == Some(value));
            if clash {
                return Err(StoreError::Duplicate(format!("{}.{}", table, column)));
            }
        }
        Ok(())
    }

    fn insert_row(
        &mut self,
        table: &'static str,
        generated_key: Option<&'static str>,
        values: &[(&'static str, SqlValue)],
    ) -> Result<u64, StoreError> {
        let mut row: Row = values
            .iter()
            .map(|(c, v)| (c.to_string(), to_json(v)))
            .collect();

        let mut generated = 0;
        if let Some(column) = generated_key {
            if row.get(column).is_none_or(Value::is_null) {
                self.next_id += 1;
                generated = self.next_id;
                row.insert(column.to_string(), Value::from(generated));
            }
        }

        self.check_unique(table, &row, None)?;
        self.tables.entry(table).or_default().push(row);
        self.writes += 1;
        Ok(generated)
    }

    fn position(&self, table: &str, column: &str, value: &SqlValue) -> Option<usize> {
        let wanted = to_json(value);
        self.tables
            .get(table)?
            .iter()
            .position(|row| row.get(column) == Some(&wanted))
    }
}

/// JSON view of a bound value, in the formats serde gives the row types.
fn to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::String(s) => Value::from(s.clone()),
        SqlValue::U64(v) => Value::from(*v),
        SqlValue::F64(v) => Value::from(*v),
        SqlValue::Date(d) => Value::from(d.format("%Y-%m-%d").to_string()),
        SqlValue::Null => Value::Null,
    }
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Less,
        (_, Some(Value::Null) | None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn decode<T: Record>(row: &Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row.clone()))
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Store laid out like `schema/mysql.sql`.
    pub fn new() -> Self {
        let mut state = State::default();
        for (table, key) in [
            (Users::TABLE, Users::PRIMARY_KEY),
            (Employees::TABLE, Employees::PRIMARY_KEY),
            (Jobs::TABLE, Jobs::PRIMARY_KEY),
            (Departments::TABLE, Departments::PRIMARY_KEY),
        ] {
            state.keys.insert(table, key);
            state.tables.insert(table, Vec::new());
        }
        state.unique.push((Users::TABLE, "email"));
        state.unique.push((Employees::TABLE, "email"));
        state.procedures.insert("sp_new_job", Jobs::TABLE);
        state.procedures.insert("sp_new_employee", Employees::TABLE);

        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }

    /// Inserts a row as-is; bypasses the write counter.
    pub fn seed<T: Serialize>(&self, table: &'static str, row: &T) {
        let Value::Object(row) = serde_json::to_value(row).expect("seed row serializes") else {
            panic!("seed row must be a JSON object");
        };
        self.lock().tables.entry(table).or_default().push(row);
    }

    /// Number of successful writes since construction.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, Vec::len)
    }

    pub fn raw_row(&self, table: &str, column: &str, value: &SqlValue) -> Option<Row> {
        let state = self.lock();
        let idx = state.position(table, column, value)?;
        Some(state.tables[table][idx].clone())
    }

    /// Makes the next store call fail with `err`.
    pub fn fail_next(&self, err: StoreError) {
        self.lock().fail_next = Some(err);
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        match self.lock().fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select_one<T: Record>(
        &self,
        select: &Select,
        value: &SqlValue,
    ) -> Result<Option<T>, StoreError> {
        self.take_failure()?;
        let state = self.lock();
        let found = match select.filter {
            Some(column) => state.position(select.table, column, value),
            None => state.tables.get(select.table).filter(|r| !r.is_empty()).map(|_| 0),
        };
        found
            .map(|idx| decode(&state.tables[select.table][idx]))
            .transpose()
    }

    async fn select_all<T: Record>(&self, select: &Select) -> Result<Vec<T>, StoreError> {
        self.take_failure()?;
        let state = self.lock();
        let mut rows: Vec<&Row> = state
            .tables
            .get(select.table)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .collect();
        if let Some(column) = select.order_by {
            rows.sort_by(|a, b| compare_cells(a.get(column), b.get(column)));
        }
        rows.into_iter().map(decode).collect()
    }

    async fn insert(&self, insert: &Insert) -> Result<u64, StoreError> {
        self.take_failure()?;
        self.lock()
            .insert_row(insert.table, insert.generated_key, &insert.values)
    }

    async fn call(&self, call: &ProcedureCall) -> Result<(), StoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let Some(table) = state.procedures.get(call.name).copied() else {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "PROCEDURE {} does not exist",
                call.name
            ))));
        };
        state.insert_row(table, None, &call.args).map(|_| ())
    }

    async fn update(&self, update: &PartialUpdate) -> Result<u64, StoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let Some(idx) = state.position(update.table, update.key_column, &update.key) else {
            return Ok(0);
        };

        let mut row = state.tables[update.table][idx].clone();
        for assignment in &update.assignments {
            match assignment {
                Assignment::Value { column, value } => {
                    row.insert(column.to_string(), to_json(value));
                }
                Assignment::CurrentTimestamp(column) => {
                    let now = serde_json::to_value(Utc::now().naive_utc())
                        .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))?;
                    row.insert(column.to_string(), now);
                }
            }
        }

        state.check_unique(update.table, &row, Some(idx))?;
        if let Some(rows) = state.tables.get_mut(update.table) {
            rows[idx] = row;
        }
        state.writes += 1;
        Ok(1)
    }

    async fn delete(
        &self,
        table: &'static str,
        key_column: &'static str,
        key: &SqlValue,
    ) -> Result<u64, StoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let Some(idx) = state.position(table, key_column, key) else {
            return Ok(0);
        };
        if let Some(rows) = state.tables.get_mut(table) {
            rows.remove(idx);
        }
        state.writes += 1;
        Ok(1)
    }

    async fn delete_all(&self, table: &'static str) -> Result<u64, StoreError> {
        self.take_failure()?;
        let mut state = self.lock();
        let removed = state.tables.get_mut(table).map_or(0, |rows| {
            let n = rows.len() as u64;
            rows.clear();
            n
        });
        state.writes += 1;
        Ok(removed)
    }
}
