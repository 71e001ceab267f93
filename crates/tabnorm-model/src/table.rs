//! Column-major table representation.

use crate::cell::CellValue;
use crate::error::{ModelError, Result};

/// A named, ordered sequence of cells.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Builds a text column from optional raw strings.
    pub fn from_raw<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(name, values.into_iter().map(CellValue::from_raw).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered set of equally long, uniquely named columns.
///
/// Row order is the position of a cell within each column. The constructors
/// reject ragged columns and duplicate names, so every `Table` in circulation
/// satisfies both invariants.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table, validating column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut table = Self {
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Appends a column at the end of the table.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.columns.iter().any(|existing| existing.name == column.name) {
            return Err(ModelError::DuplicateColumn {
                column: column.name,
            });
        }
        if let Some(first) = self.columns.first()
            && first.len() != column.len()
        {
            let found = column.len();
            return Err(ModelError::RaggedColumns {
                column: column.name,
                expected: first.len(),
                found,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Cells of one row in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&CellValue>> {
        if idx >= self.height() {
            return None;
        }
        Some(self.columns.iter().map(|column| &column.values[idx]).collect())
    }
}
