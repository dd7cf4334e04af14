use sdc_core::CellRef;
use sdc_graph::{ConstraintGraph, ConstraintId, ConstraintKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adequacy::required_secondary;

/// One covering inequality: at least `required` of `members` are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverRow {
    /// Constraint the row protects.
    pub constraint: ConstraintId,
    /// Label of that constraint.
    pub label: String,
    /// Type tag of that constraint.
    pub kind: ConstraintKind,
    /// Primary-suppressed members of the constraint.
    pub primary: usize,
    /// Variable positions of the eligible members, ascending.
    pub members: Vec<usize>,
    /// Adequacy requirement for the constraint.
    pub required: usize,
}

/// Binary set covering program derived from a constraint graph.
///
/// Variable `i` stands for the `i`-th non-primary cell of the graph;
/// choosing it means suppressing that cell as a secondary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverProgram {
    cells: Vec<CellRef>,
    costs: Vec<f64>,
    rows: Vec<CoverRow>,
}

impl CoverProgram {
    /// Builds the program. Only constraints with at least one primary
    /// member produce a row.
    pub fn from_graph(graph: &ConstraintGraph) -> Self {
        let mut positions = vec![None; graph.cells().len()];
        let mut cells = Vec::new();
        let mut costs = Vec::new();
        for (index, node) in graph.cells().iter().enumerate() {
            if !node.is_primary {
                positions[index] = Some(cells.len());
                cells.push(node.cell);
                costs.push(node.suppression_cost);
            }
        }

        let mut rows = Vec::new();
        for constraint in graph.constraints() {
            let primary = graph.primary_count(constraint);
            if primary == 0 {
                continue;
            }
            let members: Vec<usize> = graph
                .available_members(constraint)
                .filter_map(|index| positions[index])
                .collect();
            let required = required_secondary(primary, members.len());
            debug!(
                constraint = %constraint.label,
                primary,
                available = members.len(),
                required,
                "protection requirement"
            );
            if required == 0 {
                continue;
            }
            rows.push(CoverRow {
                constraint: constraint.id,
                label: constraint.label.clone(),
                kind: constraint.kind,
                primary,
                members,
                required,
            });
        }
        Self { cells, costs, rows }
    }

    /// Number of decision variables.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the program has no decision variables.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell behind each variable.
    pub fn cells(&self) -> &[CellRef] {
        &self.cells
    }

    /// Suppression cost of each variable.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// Covering rows in constraint order (rows, columns, margins).
    pub fn rows(&self) -> &[CoverRow] {
        &self.rows
    }

    /// Total cost of a selection.
    pub fn cost_of(&self, selection: &[bool]) -> f64 {
        self.costs
            .iter()
            .zip(selection)
            .filter(|(_, chosen)| **chosen)
            .map(|(cost, _)| *cost)
            .sum()
    }

    /// Rows whose requirement the selection does not meet.
    ///
    /// A selection of the wrong length leaves every row unmet.
    pub fn unmet_rows<'a>(
        &'a self,
        selection: &'a [bool],
    ) -> impl Iterator<Item = &'a CoverRow> + 'a {
        let sized = selection.len() == self.cells.len();
        self.rows.iter().filter(move |row| {
            !sized
                || row
                    .members
                    .iter()
                    .filter(|member| selection[**member])
                    .count()
                    < row.required
        })
    }

    /// Cells chosen by a selection, in variable order.
    pub fn selected_cells<'a>(
        &'a self,
        selection: &'a [bool],
    ) -> impl Iterator<Item = CellRef> + 'a {
        self.cells
            .iter()
            .zip(selection)
            .filter(|(_, chosen)| **chosen)
            .map(|(cell, _)| *cell)
    }
}
