//! Tabular query results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A column description in a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Column name or alias, as returned by the backend.
    pub name: String,
    /// Declared type, backend-specific (e.g. `varchar`, `bigint`, `object`).
    pub data_type: String,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A fully materialised query result.
///
/// Rows are stored positionally; `rows[i][j]` is the value of `columns[j]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<ResultColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ResultColumn>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Column names in result order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn first_row(&self) -> Option<&[Value]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// All values of one column, top to bottom.
    ///
    /// Rows shorter than the column list yield `Value::Null` for the missing cell.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Whether a declared column type is the "string/object" sentinel.
///
/// Accepts the pandas-style `object` plus the SQL character types, including
/// parameterised forms such as `varchar(255)`.
pub fn is_string_type(declared: &str) -> bool {
    let lowered = declared.trim().to_ascii_lowercase();
    let base = lowered
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or("");
    matches!(
        base,
        "object" | "string" | "str" | "varchar" | "char" | "text" | "nvarchar" | "nchar"
    )
}
