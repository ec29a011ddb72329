use crate::Value;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a mutating statement.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbResult {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Last inserted identifier, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

/// A result column as reported by the driver.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type name, empty when the driver has none (e.g. expressions).
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Shared reference-counted column list.
pub type Columns = Arc<[ColumnInfo]>;
/// Owned row value slice matching `Columns` length.
pub type Row = Box<[Value]>;

/// Items emitted by [`crate::Executor::query`].
///
/// `Columns` is emitted exactly once, before any `Row`.
#[derive(Debug, Clone)]
pub enum QueryResult {
    Columns(Columns),
    Row(Row),
}

impl From<Row> for QueryResult {
    fn from(value: Row) -> Self {
        QueryResult::Row(value)
    }
}

impl From<Columns> for QueryResult {
    fn from(value: Columns) -> Self {
        QueryResult::Columns(value)
    }
}
