//! Row types and the descriptors that drive the generic CRUD handlers.

pub mod department;
pub mod employee;
pub mod job;
pub mod role;
pub mod user;

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::store::Record;
use crate::utils::db_utils::{Select, SqlValue};

/// How a JSON body value is turned into a bind value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
}

impl FieldKind {
    /// `None` when the value has the wrong shape for the column.
    /// Numeric strings are accepted for numeric kinds; form inputs send them.
    pub fn convert(self, value: &Value) -> Option<SqlValue> {
        match (self, value) {
            (FieldKind::Text, Value::String(s)) => Some(SqlValue::String(s.clone())),
            (FieldKind::Integer, Value::Number(n)) => n.as_u64().map(SqlValue::U64),
            (FieldKind::Integer, Value::String(s)) => s.trim().parse().ok().map(SqlValue::U64),
            (FieldKind::Decimal, Value::Number(n)) => n.as_f64().map(SqlValue::F64),
            (FieldKind::Decimal, Value::String(s)) => s.trim().parse().ok().map(SqlValue::F64),
            (FieldKind::Date, Value::String(s)) => parse_date(s).map(SqlValue::Date),
            _ => None,
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Allow-list of columns a partial update may touch.
pub trait UpdateField: IntoEnumIterator + Copy + Send + Sync + 'static {
    fn column(self) -> &'static str;
    fn kind(self) -> FieldKind;
}

/// Table descriptor for one REST resource.
pub trait Resource: 'static {
    type Row: Record + Serialize + Clone;
    type Key: FromStr + Display + Clone + Into<SqlValue> + Send + Sync + 'static;
    type Field: UpdateField;

    /// Lower-case noun used in messages ("employee").
    const NOUN: &'static str;
    /// Capitalised noun ("Employee").
    const TITLE: &'static str;
    /// Route parameter carrying the key.
    const PARAM: &'static str;
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str;
    /// Columns safe to return to clients.
    const COLUMNS: &'static [&'static str];

    fn key(row: &Self::Row) -> Self::Key;

    fn by_key() -> Select {
        Select::from(Self::TABLE, Self::COLUMNS).filter_by(Self::PRIMARY_KEY)
    }

    fn listing() -> Select {
        Select::from(Self::TABLE, Self::COLUMNS).order_by(Self::PRIMARY_KEY)
    }
}

/// Resources whose rows belong to an authenticated principal.
pub trait Owned: Resource {
    fn owner_id(row: &Self::Row) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn convert_respects_field_kinds() {
        assert_eq!(
            FieldKind::Decimal.convert(&json!("9000.5")),
            Some(SqlValue::F64(9000.5))
        );
        assert_eq!(FieldKind::Integer.convert(&json!(100)), Some(SqlValue::U64(100)));
        assert_eq!(FieldKind::Integer.convert(&json!(-1)), None);
        assert_eq!(FieldKind::Text.convert(&json!(5)), None);
        assert_eq!(
            FieldKind::Date.convert(&json!("2025-12-05T10:00:00Z")),
            Some(SqlValue::Date(NaiveDate::from_ymd_opt(2025, 12, 5).unwrap()))
        );
        assert_eq!(FieldKind::Date.convert(&json!("05/12/2025")), None);
    }
}
