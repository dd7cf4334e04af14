use std::collections::BTreeMap;

use sdc_core::CellRef;
use serde::{Deserialize, Serialize};

use crate::ids::ConstraintId;

/// Which published total a constraint represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    /// Row total.
    Row,
    /// Column total.
    Column,
    /// Externally supplied margin total.
    Margin,
}

impl ConstraintKind {
    /// Lower-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Row => "row",
            ConstraintKind::Column => "column",
            ConstraintKind::Margin => "margin",
        }
    }
}

/// A numeric cell participating in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellNode {
    /// Table coordinates.
    pub cell: CellRef,
    /// True cell value.
    pub value: f64,
    /// Whether the primary pass suppressed the cell.
    pub is_primary: bool,
    /// Cost of hiding the cell; grows with its magnitude.
    pub suppression_cost: f64,
    /// Cost multiplier, 1 by default.
    pub sensitivity_level: f64,
}

/// An additive relationship: the member values sum to a published total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Identifier within the graph.
    pub id: ConstraintId,
    /// Stable label such as `row_3`, `col_1` or a margin name.
    pub label: String,
    /// Constraint type tag.
    pub kind: ConstraintKind,
    /// Member cell indices in ascending order.
    pub members: Vec<usize>,
    /// Published total (sum of member values).
    pub total: f64,
}

/// A materialized co-membership edge between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoMembershipEdge {
    /// Lower cell index.
    pub a: usize,
    /// Higher cell index.
    pub b: usize,
    /// Constraint both cells belong to.
    pub constraint: ConstraintId,
    /// Type tag of that constraint.
    pub kind: ConstraintKind,
}

/// Immutable constraint graph built for one suppression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintGraph {
    pub(crate) cells: Vec<CellNode>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) memberships: Vec<Vec<ConstraintId>>,
    pub(crate) lookup: BTreeMap<CellRef, usize>,
}

impl ConstraintGraph {
    /// All cell nodes, in row-major table order.
    pub fn cells(&self) -> &[CellNode] {
        &self.cells
    }

    /// Cell node by index.
    pub fn cell(&self, index: usize) -> Option<&CellNode> {
        self.cells.get(index)
    }

    /// Index of the node for `cell`, if the cell is numeric.
    pub fn cell_index(&self, cell: CellRef) -> Option<usize> {
        self.lookup.get(&cell).copied()
    }

    /// All constraints: rows, then columns, then margins.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraint by identifier.
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id.index())
    }

    /// Constraints a cell belongs to.
    pub fn memberships(&self, index: usize) -> &[ConstraintId] {
        self.memberships
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cells sharing at least one constraint with `index`, tagged by the shared constraint.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = (usize, ConstraintId)> + '_ {
        self.memberships(index).iter().flat_map(move |id| {
            self.constraints[id.index()]
                .members
                .iter()
                .copied()
                .filter(move |other| *other != index)
                .map(move |other| (other, *id))
        })
    }

    /// Every pairwise co-membership edge. Quadratic in constraint size.
    pub fn edges(&self) -> Vec<CoMembershipEdge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for constraint in &self.constraints {
            for (offset, a) in constraint.members.iter().enumerate() {
                for b in &constraint.members[offset + 1..] {
                    edges.push(CoMembershipEdge {
                        a: *a,
                        b: *b,
                        constraint: constraint.id,
                        kind: constraint.kind,
                    });
                }
            }
        }
        edges
    }

    /// Number of pairwise co-membership edges, computed without materializing them.
    pub fn edge_count(&self) -> usize {
        self.constraints
            .iter()
            .map(|constraint| {
                let n = constraint.members.len();
                n * n.saturating_sub(1) / 2
            })
            .sum()
    }

    /// Number of primary-suppressed members of a constraint.
    pub fn primary_count(&self, constraint: &Constraint) -> usize {
        constraint
            .members
            .iter()
            .filter(|index| self.cells[**index].is_primary)
            .count()
    }

    /// Members of a constraint that are eligible for secondary suppression.
    pub fn available_members<'a>(
        &'a self,
        constraint: &'a Constraint,
    ) -> impl Iterator<Item = usize> + 'a {
        constraint
            .members
            .iter()
            .copied()
            .filter(move |index| !self.cells[*index].is_primary)
    }

    /// Number of primary-suppressed cells in the graph.
    pub fn primary_total(&self) -> usize {
        self.cells.iter().filter(|node| node.is_primary).count()
    }
}
