use std::collections::BTreeSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sdc_core::{CellRef, SdcError};
use sdc_graph::ConstraintGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{Deadline, IntegerBackend, MicroLpBackend, UnavailableBackend};
use crate::config::{BackendKind, SolveMode, SolverConfig};
use crate::failure::SolverFailure;
use crate::heuristic::heuristic_cover;
use crate::program::CoverProgram;

/// Which procedure produced the secondary set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveStrategy {
    /// Cost-optimal selection from the integer backend.
    Optimizer,
    /// Greedy fallback.
    Heuristic,
}

impl SolveStrategy {
    /// Lower-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStrategy::Optimizer => "optimizer",
            SolveStrategy::Heuristic => "heuristic",
        }
    }
}

/// Secondary suppression result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryOutcome {
    /// Secondary-suppressed cells.
    pub secondary: BTreeSet<CellRef>,
    /// Procedure that produced `secondary`.
    pub strategy: SolveStrategy,
    /// Why the optimizer was not used, if it was attempted and failed.
    pub failure: Option<SolverFailure>,
    /// Total suppression cost of `secondary`.
    pub objective_cost: f64,
    /// Name of the configured backend.
    pub backend: String,
    /// Labels of constraints whose requirement is still unmet.
    pub unmet_constraints: Vec<String>,
}

/// Selects secondary suppressions for a built constraint graph.
pub struct SecondarySuppressionSolver {
    backend: Arc<dyn IntegerBackend>,
    mode: SolveMode,
    time_budget: Duration,
}

impl std::fmt::Debug for SecondarySuppressionSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecondarySuppressionSolver")
            .field("backend", &self.backend.name())
            .field("mode", &self.mode)
            .field("time_budget", &self.time_budget)
            .finish()
    }
}

impl SecondarySuppressionSolver {
    /// Creates a solver in optimizer mode around `backend`.
    pub fn new(backend: Arc<dyn IntegerBackend>, time_budget: Duration) -> Self {
        Self {
            backend,
            mode: SolveMode::Optimizer,
            time_budget,
        }
    }

    /// Creates the solver described by a validated configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self, SdcError> {
        config.validate()?;
        let backend: Arc<dyn IntegerBackend> = match config.backend {
            BackendKind::Microlp => Arc::new(MicroLpBackend),
            BackendKind::None => {
                Arc::new(UnavailableBackend::new("backend disabled by configuration"))
            }
        };
        let budget = Duration::from_millis(config.time_budget_ms);
        Ok(Self::new(backend, budget).with_mode(config.mode))
    }

    /// Overrides the selection mode.
    pub fn with_mode(mut self, mode: SolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Chooses the secondary set.
    ///
    /// In optimizer mode the backend runs on a worker thread bounded by the
    /// time budget. When the budget runs out the worker is cancelled and
    /// joined before the heuristic runs. An answer is accepted only if it
    /// meets every row; otherwise the heuristic runs and the failure is
    /// recorded.
    pub fn solve(&self, graph: &ConstraintGraph) -> SecondaryOutcome {
        let program = CoverProgram::from_graph(graph);
        let (selection, strategy, failure) = match self.mode {
            SolveMode::Heuristic => (
                heuristic_cover(&program, &[]),
                SolveStrategy::Heuristic,
                None,
            ),
            SolveMode::Optimizer => match self.optimize(&program) {
                Ok(selection) => (selection, SolveStrategy::Optimizer, None),
                Err(failure) => {
                    warn!(
                        backend = self.backend.name(),
                        kind = failure.kind(),
                        detail = %failure,
                        "optimizer failed; using heuristic"
                    );
                    (
                        heuristic_cover(&program, &[]),
                        SolveStrategy::Heuristic,
                        Some(failure),
                    )
                }
            },
        };

        let unmet_constraints: Vec<String> = program
            .unmet_rows(&selection)
            .map(|row| row.label.clone())
            .collect();
        if !unmet_constraints.is_empty() {
            warn!(unmet = unmet_constraints.len(), "constraints left under-protected");
        }
        let outcome = SecondaryOutcome {
            secondary: program.selected_cells(&selection).collect(),
            strategy,
            failure,
            objective_cost: program.cost_of(&selection),
            backend: self.backend.name().to_string(),
            unmet_constraints,
        };
        info!(
            rows = program.rows().len(),
            secondary = outcome.secondary.len(),
            strategy = outcome.strategy.as_str(),
            cost = outcome.objective_cost,
            "secondary suppression complete"
        );
        outcome
    }

    fn optimize(&self, program: &CoverProgram) -> Result<Vec<bool>, SolverFailure> {
        let (sender, receiver) = mpsc::channel();
        let backend = Arc::clone(&self.backend);
        let job = program.clone();
        let deadline = Deadline::after(self.time_budget);
        let worker_deadline = deadline.clone();
        let worker = thread::Builder::new()
            .name("sdc-optimizer".to_string())
            .spawn(move || {
                let _ = sender.send(backend.solve(&job, &worker_deadline));
            })
            .map_err(|err| SolverFailure::Abnormal {
                detail: err.to_string(),
            })?;

        let received = receiver.recv_timeout(self.time_budget);
        // The worker stops at its next deadline check; nothing runs past this join.
        deadline.cancel();
        if worker.join().is_err() {
            debug!(backend = self.backend.name(), "optimizer worker panicked");
        }
        let selection = match received {
            Ok(result) => result?,
            Err(RecvTimeoutError::Timeout) => return Err(deadline.timed_out()),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(SolverFailure::Abnormal {
                    detail: "optimizer worker exited without a result".to_string(),
                })
            }
        };

        if selection.len() != program.len() {
            return Err(SolverFailure::Abnormal {
                detail: format!(
                    "backend returned {} decisions for {} variables",
                    selection.len(),
                    program.len()
                ),
            });
        }
        if let Some(row) = program.unmet_rows(&selection).next() {
            return Err(SolverFailure::Abnormal {
                detail: format!("backend solution leaves {} under-protected", row.label),
            });
        }
        Ok(selection)
    }
}
