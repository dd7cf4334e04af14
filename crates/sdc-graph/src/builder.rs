use std::collections::{BTreeMap, BTreeSet};

use sdc_core::errors::{ErrorInfo, SdcError};
use sdc_core::{CellRef, Table};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::graph::{CellNode, Constraint, ConstraintGraph, ConstraintKind};
use crate::ids::ConstraintId;

/// Externally supplied margin: a named set of cells with a published total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginSpec {
    /// Margin label, unique within the run.
    pub id: String,
    /// Cells summed by the margin.
    pub cells: Vec<CellRef>,
}

/// Suppression cost of a cell: `sensitivity * (1 + |value|)`.
pub fn suppression_cost(value: f64, sensitivity_level: f64) -> f64 {
    sensitivity_level * (1.0 + value.abs())
}

/// Builds a [`ConstraintGraph`] from a table and its primary set.
#[derive(Debug, Clone)]
pub struct ConstraintGraphBuilder<'a> {
    table: &'a Table,
    margins: Vec<MarginSpec>,
    sensitivity: BTreeMap<CellRef, f64>,
}

struct Draft {
    label: String,
    kind: ConstraintKind,
    members: Vec<usize>,
}

impl<'a> ConstraintGraphBuilder<'a> {
    /// Starts a builder for `table`.
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            margins: Vec::new(),
            sensitivity: BTreeMap::new(),
        }
    }

    /// Adds externally supplied margin constraints.
    pub fn with_margins(mut self, margins: impl IntoIterator<Item = MarginSpec>) -> Self {
        self.margins.extend(margins);
        self
    }

    /// Sets the sensitivity multiplier of a single cell.
    pub fn with_sensitivity(mut self, cell: CellRef, level: f64) -> Self {
        self.sensitivity.insert(cell, level);
        self
    }

    /// Builds the graph: one node per numeric cell, one constraint per row,
    /// per column and per margin.
    pub fn build(&self, primary: &BTreeSet<CellRef>) -> Result<ConstraintGraph, SdcError> {
        self.validate(primary)?;

        let mut cells = Vec::new();
        let mut lookup = BTreeMap::new();
        for (cell, value) in self.table.cells() {
            let sensitivity_level = self.sensitivity.get(&cell).copied().unwrap_or(1.0);
            lookup.insert(cell, cells.len());
            cells.push(CellNode {
                cell,
                value,
                is_primary: primary.contains(&cell),
                suppression_cost: suppression_cost(value, sensitivity_level),
                sensitivity_level,
            });
        }

        let (rows, columns) = rayon::join(
            || self.row_drafts(&lookup),
            || self.column_drafts(&lookup),
        );
        let margins = self.margin_drafts(&lookup);

        let mut constraints = Vec::new();
        let mut memberships = vec![Vec::new(); cells.len()];
        for draft in rows.into_iter().chain(columns).chain(margins) {
            let id = ConstraintId::from_index(constraints.len());
            for member in &draft.members {
                memberships[*member].push(id);
            }
            let total = draft.members.iter().map(|index| cells[*index].value).sum();
            constraints.push(Constraint {
                id,
                label: draft.label,
                kind: draft.kind,
                members: draft.members,
                total,
            });
        }

        let graph = ConstraintGraph {
            cells,
            constraints,
            memberships,
            lookup,
        };
        info!(
            cells = graph.cells().len(),
            constraints = graph.constraints().len(),
            edges = graph.edge_count(),
            "constraint graph built"
        );
        Ok(graph)
    }

    fn validate(&self, primary: &BTreeSet<CellRef>) -> Result<(), SdcError> {
        if let Some(cell) = primary
            .iter()
            .find(|cell| self.table.value(**cell).is_none())
        {
            return Err(SdcError::Data(
                ErrorInfo::new("primary-unknown-cell", "primary cell is missing or outside the table")
                    .with_cell(*cell),
            ));
        }
        for (cell, level) in &self.sensitivity {
            if !level.is_finite() || *level <= 0.0 {
                return Err(SdcError::Configuration(
                    ErrorInfo::new("sensitivity-level", "sensitivity level must be positive")
                        .with_cell(*cell)
                        .with_context("level", level.to_string()),
                ));
            }
        }
        let mut ids = BTreeSet::new();
        for margin in &self.margins {
            if !ids.insert(margin.id.as_str()) {
                return Err(SdcError::Data(
                    ErrorInfo::new("duplicate-margin", "margin identifier used twice")
                        .with_context("margin", margin.id.clone()),
                ));
            }
            if let Some(cell) = margin.cells.iter().find(|cell| !self.table.contains(**cell)) {
                return Err(SdcError::Data(
                    ErrorInfo::new("margin-unknown-cell", "margin references a cell outside the table")
                        .with_context("margin", margin.id.clone())
                        .with_cell(*cell),
                ));
            }
        }
        Ok(())
    }

    fn row_drafts(&self, lookup: &BTreeMap<CellRef, usize>) -> Vec<Draft> {
        (0..self.table.row_count())
            .map(|row| Draft {
                label: format!("row_{row}"),
                kind: ConstraintKind::Row,
                members: (0..self.table.column_count())
                    .filter_map(|column| lookup.get(&CellRef::new(row, column)).copied())
                    .collect(),
            })
            .collect()
    }

    fn column_drafts(&self, lookup: &BTreeMap<CellRef, usize>) -> Vec<Draft> {
        (0..self.table.column_count())
            .map(|column| Draft {
                label: format!("col_{column}"),
                kind: ConstraintKind::Column,
                members: (0..self.table.row_count())
                    .filter_map(|row| lookup.get(&CellRef::new(row, column)).copied())
                    .collect(),
            })
            .collect()
    }

    fn margin_drafts(&self, lookup: &BTreeMap<CellRef, usize>) -> Vec<Draft> {
        self.margins
            .iter()
            .map(|margin| {
                let members: BTreeSet<usize> = margin
                    .cells
                    .iter()
                    .filter_map(|cell| lookup.get(cell).copied())
                    .collect();
                Draft {
                    label: margin.id.clone(),
                    kind: ConstraintKind::Margin,
                    members: members.into_iter().collect(),
                }
            })
            .collect()
    }
}
