//! In-memory tables and their row-record JSON form.
//!
//! Tables are persisted as a sequence of row objects keyed by column name.
//! No schema is stored: on reload, columns are the union of the keys seen
//! across records (first-seen order) and missing cells become [`Scalar::Null`].

use std::borrow::Cow;

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A single row as persisted.
pub type Record = Map<String, Value>;

/// Table serialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Row width differs from the column count.
    #[error("row has {actual} cells, table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    /// A cell cannot be represented in JSON.
    #[error("cell in column '{column}' is not JSON-serializable: {reason}")]
    NotSerializable { column: String, reason: String },

    /// Two columns share a name; records cannot hold both.
    #[error("duplicate column name '{column}'")]
    DuplicateColumn { column: String },
}

/// A table cell.
///
/// A `Json` cell holding a plain JSON scalar compares equal to the typed
/// variant it reloads as, so `Json(json!(5)) == Int(5)`.
#[derive(Debug, Clone)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Nested JSON (arrays, objects, numbers outside `i64`).
    Json(Value),
}

impl Scalar {
    /// Cell from arbitrary JSON, typed the same way records are on reload.
    pub fn json(value: Value) -> Self {
        Self::from(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.canonical().as_ref(), Self::Null)
    }

    /// The variant this cell takes after a trip through its JSON form.
    fn canonical(&self) -> Cow<'_, Scalar> {
        match self {
            Self::Json(Value::Array(_) | Value::Object(_)) => Cow::Borrowed(self),
            Self::Json(v) => Cow::Owned(Self::from(v.clone())),
            _ => Cow::Borrowed(self),
        }
    }

    /// JSON form of the cell. Fails for non-finite floats.
    pub fn to_json(&self) -> Result<Value, String> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::Float(f) => Value::Number(
                Number::from_f64(*f).ok_or_else(|| format!("non-finite float {}", f))?,
            ),
            Self::Text(s) => Value::String(s.clone()),
            Self::Json(v) => v.clone(),
        })
    }

    fn column_type(&self) -> ColumnType {
        match self.canonical().as_ref() {
            Self::Null => ColumnType::Null,
            Self::Bool(_) => ColumnType::Bool,
            Self::Int(_) => ColumnType::Int,
            Self::Float(_) => ColumnType::Float,
            Self::Text(_) => ColumnType::Text,
            Self::Json(_) => ColumnType::Json,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self.canonical().as_ref(), other.canonical().as_ref()) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Int(i),
                (None, Some(f)) if n.is_f64() => Self::Float(f),
                _ => Self::Json(Value::Number(n)),
            },
            Value::String(s) => Self::Text(s),
            other => Self::Json(other),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

/// Type inferred for a column from its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Every cell is null.
    Null,
    Bool,
    Int,
    Float,
    Text,
    Json,
    /// Cells of incompatible types.
    Mixed,
}

impl ColumnType {
    fn unify(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, t) | (t, Null) => t,
            (Int, Float) | (Float, Int) => Float,
            _ => Mixed,
        }
    }
}

/// Rows of scalar cells under named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`Table::push_row`].
    pub fn with_row(mut self, row: Vec<Scalar>) -> Result<Self, TableError> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of a column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Scalar>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Type inferred from the cells of a column.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        let cells = self.column(name)?;
        Some(
            cells
                .map(Scalar::column_type)
                .fold(ColumnType::Null, ColumnType::unify),
        )
    }

    /// Rebuild a table from row records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().map_or(Scalar::Null, Scalar::from))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Row-major record form, one object per row.
    ///
    /// Fails when column names repeat, since a record keeps one value per key.
    pub fn to_records(&self) -> Result<Vec<Record>, TableError> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].contains(column) {
                return Err(TableError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }

        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| {
                        cell.to_json()
                            .map(|v| (column.clone(), v))
                            .map_err(|reason| TableError::NotSerializable {
                                column: column.clone(),
                                reason,
                            })
                    })
                    .collect()
            })
            .collect()
    }
}
