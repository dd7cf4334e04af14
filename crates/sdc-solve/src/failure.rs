use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Non-fatal reasons the optimizer did not produce a usable selection.
///
/// Every variant triggers the heuristic fallback and is recorded in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SolverFailure {
    /// The cover program has no feasible selection.
    #[error("optimizer reported the program infeasible")]
    Infeasible,
    /// The objective is unbounded.
    #[error("optimizer reported the program unbounded")]
    Unbounded,
    /// The backend failed or returned an unusable solution.
    #[error("optimizer failed: {detail}")]
    Abnormal {
        /// Backend specific description.
        detail: String,
    },
    /// The backend stopped without a usable point, for example a relaxation
    /// with non-finite coordinates.
    #[error("optimizer returned without solving")]
    NotSolved,
    /// No backend is configured or the backend cannot run here.
    #[error("optimizer unavailable: {detail}")]
    Unavailable {
        /// Why the backend is unavailable.
        detail: String,
    },
    /// The time budget ran out before the backend answered.
    #[error("optimizer exceeded its {budget_ms} ms budget")]
    TimedOut {
        /// Configured budget in milliseconds.
        budget_ms: u64,
    },
}

impl SolverFailure {
    /// Short kebab-case label for logs and statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            SolverFailure::Infeasible => "infeasible",
            SolverFailure::Unbounded => "unbounded",
            SolverFailure::Abnormal { .. } => "abnormal",
            SolverFailure::NotSolved => "not-solved",
            SolverFailure::Unavailable { .. } => "unavailable",
            SolverFailure::TimedOut { .. } => "timed-out",
        }
    }
}
