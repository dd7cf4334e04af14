#![deny(missing_docs)]
#![doc = "Core table, identifier and error types for the SDC cell suppression engine."]

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;
pub mod schema;
mod table;

pub use errors::{ErrorInfo, SdcError};
pub use rng::{derive_substream_seed, RngHandle};
pub use schema::SchemaVersion;
pub use table::{Table, TableRow};

/// Coordinates of a value cell: row position and value-column position.
///
/// The column index addresses [`Table::value_columns`], not the explanatory
/// columns. Identity is unique within one suppression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellRef {
    /// Zero based row position.
    pub row: usize,
    /// Zero based value-column position.
    pub column: usize,
}

impl CellRef {
    /// Creates a new cell reference.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell_{}_{}", self.row, self.column)
    }
}
