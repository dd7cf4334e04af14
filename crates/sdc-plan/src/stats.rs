use std::collections::BTreeMap;

use sdc_core::CellRef;
use sdc_rules::{ConfidentialityFlag, ContributorSource, ProtectionRuleConfig};
use sdc_solve::{SolveStrategy, SolverFailure};
use serde::{Deserialize, Serialize};

/// Statistics carried by a [`SuppressionPlan`](crate::SuppressionPlan).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuppressionStatistics {
    /// Value cells in the table, present or missing.
    pub total_cells: usize,
    /// Primary suppressions.
    pub primary_suppressions: usize,
    /// Secondary suppressions.
    pub secondary_suppressions: usize,
    /// Primary plus secondary.
    pub total_suppressions: usize,
    /// `total_suppressions / total_cells`, zero for an empty table.
    pub suppression_rate: f64,
    /// Always `hypercube`.
    pub method: String,
    /// Thresholds the primary pass used.
    pub protection_rules: ProtectionRuleConfig,
    /// Primary cells in row-major order.
    pub primary_cells: Vec<CellRef>,
    /// Secondary cells in row-major order.
    pub secondary_cells: Vec<CellRef>,
    /// Examined cells per confidentiality flag.
    pub by_flag: BTreeMap<ConfidentialityFlag, usize>,
    /// Examined cells per contributor source.
    pub by_source: BTreeMap<ContributorSource, usize>,
    /// Procedure that chose the secondary set.
    pub strategy: SolveStrategy,
    /// Optimizer failure that forced the heuristic, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_failure: Option<SolverFailure>,
    /// Configured backend name.
    pub backend: String,
    /// Total suppression cost of the secondary set.
    pub objective_cost: f64,
    /// Constraints still under-protected after solving.
    pub unmet_constraints: Vec<String>,
}

pub(crate) fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
