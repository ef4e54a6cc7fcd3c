use chrono::NaiveDate;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    F64(f64),
    Date(NaiveDate),
    Null,
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// ===============================
/// SQL statement container
/// ===============================
#[derive(Debug)]
pub struct SqlStatement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Single-table SELECT, optionally filtered by one column.
#[derive(Debug, Clone)]
pub struct Select {
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub filter: Option<&'static str>,
    pub order_by: Option<&'static str>,
}

impl Select {
    pub fn from(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            filter: None,
            order_by: None,
        }
    }

    pub fn filter_by(mut self, column: &'static str) -> Self {
        self.filter = Some(column);
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(column);
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        if let Some(column) = self.filter {
            sql.push_str(&format!(" WHERE {} = ?", column));
        }
        if let Some(column) = self.order_by {
            sql.push_str(&format!(" ORDER BY {}", column));
        }
        sql
    }
}

/// INSERT of explicit column/value pairs.
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: &'static str,
    /// Primary key filled in by the database when absent from `values`.
    pub generated_key: Option<&'static str>,
    pub values: Vec<(&'static str, SqlValue)>,
}

impl Insert {
    pub fn into_table(table: &'static str) -> Self {
        Self {
            table,
            generated_key: None,
            values: Vec::new(),
        }
    }

    pub fn generated_key(mut self, column: &'static str) -> Self {
        self.generated_key = Some(column);
        self
    }

    pub fn value(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    pub fn to_sql(&self) -> SqlStatement {
        let columns: Vec<&str> = self.values.iter().map(|(c, _)| *c).collect();
        SqlStatement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                placeholders(columns.len())
            ),
            values: self.values.iter().map(|(_, v)| v.clone()).collect(),
        }
    }
}

/// Stored procedure invocation with positional binds.
///
/// Arguments keep the column they populate so alternative stores can map a
/// call back onto a row.
#[derive(Debug, Clone)]
pub struct ProcedureCall {
    pub name: &'static str,
    pub args: Vec<(&'static str, SqlValue)>,
}

impl ProcedureCall {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.args.push((column, value.into()));
        self
    }

    pub fn to_sql(&self) -> SqlStatement {
        SqlStatement {
            sql: format!("CALL {}({})", self.name, placeholders(self.args.len())),
            values: self.args.iter().map(|(_, v)| v.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Value { column: &'static str, value: SqlValue },
    CurrentTimestamp(&'static str),
}

/// ===============================
/// Partial UPDATE builder
/// ===============================
///
/// Column names only ever come from `&'static str` descriptors, values are
/// always bound.
#[derive(Debug, Clone)]
pub struct PartialUpdate {
    pub table: &'static str,
    pub key_column: &'static str,
    pub key: SqlValue,
    pub assignments: Vec<Assignment>,
}

impl PartialUpdate {
    pub fn new(table: &'static str, key_column: &'static str, key: impl Into<SqlValue>) -> Self {
        Self {
            table,
            key_column,
            key: key.into(),
            assignments: Vec::new(),
        }
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) -> &mut Self {
        self.assignments.push(Assignment::Value { column, value });
        self
    }

    /// Always-applied `column = CURRENT_TIMESTAMP`; does not count as a change.
    pub fn touch(&mut self, column: &'static str) -> &mut Self {
        self.assignments.push(Assignment::CurrentTimestamp(column));
        self
    }

    pub fn has_changes(&self) -> bool {
        self.assignments
            .iter()
            .any(|a| matches!(a, Assignment::Value { .. }))
    }

    pub fn to_sql(&self) -> SqlStatement {
        let mut fragments = Vec::with_capacity(self.assignments.len());
        let mut values = Vec::with_capacity(self.assignments.len() + 1);

        for assignment in &self.assignments {
            match assignment {
                Assignment::Value { column, value } => {
                    fragments.push(format!("{} = ?", column));
                    values.push(value.clone());
                }
                Assignment::CurrentTimestamp(column) => {
                    fragments.push(format!("{} = CURRENT_TIMESTAMP", column));
                }
            }
        }

        // WHERE pk = ?
        values.push(self.key.clone());

        SqlStatement {
            sql: format!(
                "UPDATE {} SET {} WHERE {} = ?",
                self.table,
                fragments.join(", "),
                self.key_column
            ),
            values,
        }
    }
}

/// Oracle-style stack marker that procedures append after the real message.
const STACK_TRACE_MARKER: &str = "ORA-06512";

/// Extracts the human-readable part of a procedure error:
/// `"ORA-20100: Salary out of range\nORA-06512: at line 7"` → `"Salary out of range"`.
pub fn clean_procedure_message(raw: &str) -> String {
    let head = raw.split(STACK_TRACE_MARKER).next().unwrap_or(raw).trim();
    let head = head.strip_prefix("Error: ").unwrap_or(head);
    strip_error_code(head).trim().to_string()
}

/// Finds an `ORA-2nnnn` application error code anywhere in `raw`.
pub fn application_error_code(raw: &str) -> Option<u32> {
    raw.match_indices("ORA-").find_map(|(idx, _)| {
        let digits = raw.get(idx + 4..idx + 9)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let code: u32 = digits.parse().ok()?;
        is_application_error(code).then_some(code)
    })
}

/// Application-defined error range used by stored procedures.
pub fn is_application_error(code: u32) -> bool {
    (20000..=20999).contains(&code)
}

fn strip_error_code(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("ORA-") else {
        return text;
    };
    match rest.get(..5) {
        Some(code) if code.bytes().all(|b| b.is_ascii_digit()) => {
            let rest = &rest[5..];
            rest.strip_prefix(':').unwrap_or(rest)
        }
        _ => text,
    }
}
