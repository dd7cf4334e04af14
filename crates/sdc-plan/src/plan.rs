use std::collections::BTreeSet;

use sdc_core::{CellRef, SchemaVersion, SdcError};
use sdc_rules::{AuditEntry, ConfidentialityFlag};
use sdc_solve::SolveStrategy;
use serde::{Deserialize, Serialize};

use crate::hash::stable_hash_string;
use crate::stats::SuppressionStatistics;

/// Publication status of one value cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellStatus {
    /// Published as is.
    Published,
    /// Hidden because a rule flagged it.
    Primary(ConfidentialityFlag),
    /// Hidden to protect a primary cell.
    Secondary,
    /// No value in the input.
    Missing,
}

/// Immutable result of a suppression run.
///
/// Self-describing: the plan carries the column names, the configuration
/// echo, both coordinate lists, the audit log and the published view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionPlan {
    schema: SchemaVersion,
    value_columns: Vec<String>,
    primary: BTreeSet<CellRef>,
    secondary: BTreeSet<CellRef>,
    audit: Vec<AuditEntry>,
    published: Vec<Vec<Option<f64>>>,
    statistics: SuppressionStatistics,
}

impl SuppressionPlan {
    pub(crate) fn new(
        value_columns: Vec<String>,
        primary: BTreeSet<CellRef>,
        secondary: BTreeSet<CellRef>,
        audit: Vec<AuditEntry>,
        published: Vec<Vec<Option<f64>>>,
        statistics: SuppressionStatistics,
    ) -> Self {
        Self {
            schema: SchemaVersion::default(),
            value_columns,
            primary,
            secondary,
            audit,
            published,
            statistics,
        }
    }

    /// Schema of the serialized plan.
    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Value column names, indexed by [`CellRef::column`].
    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Primary-suppressed cells.
    pub fn primary(&self) -> &BTreeSet<CellRef> {
        &self.primary
    }

    /// Secondary-suppressed cells.
    pub fn secondary(&self) -> &BTreeSet<CellRef> {
        &self.secondary
    }

    /// Audit log of the primary cells, holding their true values.
    pub fn audit(&self) -> &[AuditEntry] {
        &self.audit
    }

    /// Table values with every suppressed cell replaced by missing.
    pub fn published(&self) -> &[Vec<Option<f64>>] {
        &self.published
    }

    /// Run statistics.
    pub fn statistics(&self) -> &SuppressionStatistics {
        &self.statistics
    }

    /// Procedure that chose the secondary set.
    pub fn strategy(&self) -> SolveStrategy {
        self.statistics.strategy
    }

    /// Whether `cell` is hidden in the published view.
    pub fn is_suppressed(&self, cell: CellRef) -> bool {
        self.primary.contains(&cell) || self.secondary.contains(&cell)
    }

    /// Status of `cell`; `None` outside the table.
    pub fn status(&self, cell: CellRef) -> Option<CellStatus> {
        let row = self.published.get(cell.row)?;
        row.get(cell.column)?;
        if self.primary.contains(&cell) {
            let flag = self
                .audit
                .iter()
                .find(|entry| entry.cell == cell)
                .map(|entry| entry.flag)
                .unwrap_or(ConfidentialityFlag::Confidential);
            return Some(CellStatus::Primary(flag));
        }
        if self.secondary.contains(&cell) {
            return Some(CellStatus::Secondary);
        }
        Some(match row[cell.column] {
            Some(_) => CellStatus::Published,
            None => CellStatus::Missing,
        })
    }

    /// SHA256 fingerprint over the canonical JSON encoding of the plan.
    pub fn fingerprint(&self) -> Result<String, SdcError> {
        stable_hash_string(self)
    }
}
