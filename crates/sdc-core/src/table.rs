use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SdcError};
use crate::CellRef;

/// One input row: explanatory labels plus one slot per value column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Explanatory (non-numeric) labels keyed by column name.
    pub labels: BTreeMap<String, String>,
    /// Values in [`Table::value_columns`] order; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
}

/// A two dimensional statistical table as handed over by an upstream loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    explanatory: Vec<String>,
    value_columns: Vec<String>,
    rows: Vec<TableRow>,
}

fn unknown_column(name: &str, row: usize) -> SdcError {
    SdcError::Data(
        ErrorInfo::new("unknown-column", "row references a column the table does not declare")
            .with_context("column", name)
            .with_context("row", row.to_string()),
    )
}

impl Table {
    /// Creates an empty table with the given explanatory and value columns.
    pub fn new(explanatory: Vec<String>, value_columns: Vec<String>) -> Result<Self, SdcError> {
        if value_columns.is_empty() {
            return Err(SdcError::Data(
                ErrorInfo::new("no-value-columns", "table declares no numeric value columns")
                    .with_hint("mark at least one column as a value column"),
            ));
        }
        let mut seen = BTreeSet::new();
        for name in explanatory.iter().chain(value_columns.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(SdcError::Data(
                    ErrorInfo::new("duplicate-column", "column declared more than once")
                        .with_context("column", name.clone()),
                ));
            }
        }
        Ok(Self {
            explanatory,
            value_columns,
            rows: Vec::new(),
        })
    }

    /// Builds a table without explanatory columns from a dense grid of values.
    pub fn from_grid<S: AsRef<str>>(
        value_columns: &[S],
        grid: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, SdcError> {
        let columns = value_columns
            .iter()
            .map(|name| name.as_ref().to_string())
            .collect::<Vec<_>>();
        let mut table = Self::new(Vec::new(), columns)?;
        for (index, values) in grid.into_iter().enumerate() {
            if values.len() != table.value_columns.len() {
                return Err(SdcError::Data(
                    ErrorInfo::new("malformed-row", "row width does not match the value columns")
                        .with_context("row", index.to_string())
                        .with_context("expected", table.value_columns.len().to_string())
                        .with_context("found", values.len().to_string()),
                ));
            }
            table.push_values(index, BTreeMap::new(), values)?;
        }
        Ok(table)
    }

    /// Appends a row given as name-to-value mappings.
    ///
    /// Value columns absent from `values` are recorded as missing.
    pub fn push_row(
        &mut self,
        labels: BTreeMap<String, String>,
        values: BTreeMap<String, Option<f64>>,
    ) -> Result<(), SdcError> {
        let row = self.rows.len();
        if let Some(name) = labels
            .keys()
            .find(|name| !self.explanatory.iter().any(|known| known == *name))
        {
            return Err(unknown_column(name, row));
        }
        if let Some(name) = values
            .keys()
            .find(|name| !self.value_columns.iter().any(|known| known == *name))
        {
            return Err(unknown_column(name, row));
        }
        let ordered = self
            .value_columns
            .iter()
            .map(|name| values.get(name).copied().flatten())
            .collect();
        self.push_values(row, labels, ordered)
    }

    fn push_values(
        &mut self,
        row: usize,
        labels: BTreeMap<String, String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), SdcError> {
        for (column, value) in values.iter().enumerate() {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(SdcError::Data(
                        ErrorInfo::new("non-finite-value", "cell value must be finite")
                            .with_context("row", row.to_string())
                            .with_context("column", self.value_columns[column].clone()),
                    ));
                }
            }
        }
        self.rows.push(TableRow { labels, values });
        Ok(())
    }

    /// Names of the explanatory columns.
    pub fn explanatory(&self) -> &[String] {
        &self.explanatory
    }

    /// Names of the value columns in positional order.
    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Name of a value column by position.
    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.value_columns.get(column).map(String::as_str)
    }

    /// Stored rows.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of value columns.
    pub fn column_count(&self) -> usize {
        self.value_columns.len()
    }

    /// Number of value cells, present or missing.
    pub fn total_cells(&self) -> usize {
        self.row_count() * self.column_count()
    }

    /// Value stored at `cell`; `None` for missing values and out-of-range references.
    pub fn value(&self, cell: CellRef) -> Option<f64> {
        self.rows
            .get(cell.row)
            .and_then(|row| row.values.get(cell.column))
            .copied()
            .flatten()
    }

    /// Whether `cell` lies inside the table bounds.
    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row < self.row_count() && cell.column < self.column_count()
    }

    /// Iterates over every present numeric cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, record)| {
            record
                .values
                .iter()
                .enumerate()
                .filter_map(move |(column, value)| value.map(|v| (CellRef::new(row, column), v)))
        })
    }
}
