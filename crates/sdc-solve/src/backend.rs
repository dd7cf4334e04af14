use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::debug;

use crate::failure::SolverFailure;
use crate::program::CoverProgram;

const INTEGRALITY_TOLERANCE: f64 = 1e-6;
const BOUND_TOLERANCE: f64 = 1e-9;

/// Point in time after which a backend must stop, plus an explicit cancel flag.
///
/// Clones share the flag, so the caller keeps one copy and hands another to
/// the worker.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        Self {
            at: now.checked_add(budget).unwrap_or(now),
            budget,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stops every holder of this deadline at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancelled or past the deadline.
    pub fn expired(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || Instant::now() >= self.at
    }

    /// Configured budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// The failure a backend reports when it stops on this deadline.
    pub fn timed_out(&self) -> SolverFailure {
        SolverFailure::TimedOut {
            budget_ms: self.budget.as_millis() as u64,
        }
    }
}

/// Narrow seam to an integer programming solver.
///
/// A backend receives a [`CoverProgram`] and returns one flag per variable.
/// Backends run on a worker thread, hence the `Send + Sync` bound. The
/// worker is joined before the caller returns, so a backend must poll
/// [`Deadline::expired`] between units of work and return promptly once it
/// fires.
pub trait IntegerBackend: Send + Sync {
    /// Name recorded in plan statistics.
    fn name(&self) -> &'static str;

    /// Solves the program to optimality or reports why it could not.
    fn solve(
        &self,
        program: &CoverProgram,
        deadline: &Deadline,
    ) -> Result<Vec<bool>, SolverFailure>;
}

/// Depth-first branch and bound whose LP relaxations are solved by
/// `good_lp` with the pure Rust `microlp` solver.
///
/// The deadline is checked before every relaxation, so no work outlives the
/// budget by more than one LP solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend;

impl IntegerBackend for MicroLpBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(
        &self,
        program: &CoverProgram,
        deadline: &Deadline,
    ) -> Result<Vec<bool>, SolverFailure> {
        if program.rows().is_empty() {
            return Ok(vec![false; program.len()]);
        }

        // Hiding every eligible cell meets every requirement.
        let mut best = vec![true; program.len()];
        let mut best_cost = program.cost_of(&best);
        let mut open: Vec<Vec<Option<bool>>> = vec![vec![None; program.len()]];
        let mut nodes = 0usize;

        while let Some(fixed) = open.pop() {
            if deadline.expired() {
                debug!(nodes, "branch and bound stopped by deadline");
                return Err(deadline.timed_out());
            }
            nodes += 1;
            let point = match relaxation(program, &fixed) {
                Ok(point) => finite_point(point)?,
                Err(ResolutionError::Infeasible) => continue,
                Err(err) => return Err(resolution_failure(err)),
            };
            let bound: f64 = point
                .iter()
                .zip(program.costs())
                .map(|(x, cost)| x * cost)
                .sum();
            if bound >= best_cost - BOUND_TOLERANCE {
                continue;
            }
            match most_fractional(&point) {
                None => {
                    best = point.iter().map(|x| *x > 0.5).collect();
                    best_cost = program.cost_of(&best);
                }
                Some(index) => {
                    let mut down = fixed.clone();
                    down[index] = Some(false);
                    let mut up = fixed;
                    up[index] = Some(true);
                    open.push(down);
                    open.push(up);
                }
            }
        }
        debug!(nodes, cost = best_cost, "branch and bound finished");
        Ok(best)
    }
}

/// Solves the LP relaxation with some variables fixed to 0 or 1.
fn relaxation(
    program: &CoverProgram,
    fixed: &[Option<bool>],
) -> Result<Vec<f64>, ResolutionError> {
    let mut variables = ProblemVariables::new();
    let decisions: Vec<Variable> = fixed
        .iter()
        .map(|fix| {
            let (low, high) = match fix {
                Some(true) => (1.0, 1.0),
                Some(false) => (0.0, 0.0),
                None => (0.0, 1.0),
            };
            variables.add(variable().min(low).max(high))
        })
        .collect();
    let objective: Expression = decisions
        .iter()
        .zip(program.costs())
        .map(|(decision, cost)| *cost * *decision)
        .sum();

    let mut model = variables.minimise(objective).using(microlp);
    for row in program.rows() {
        let covered: Expression = row.members.iter().map(|member| decisions[*member]).sum();
        let required = row.required as f64;
        model = model.with(constraint!(covered >= required));
    }
    let solution = model.solve()?;
    Ok(decisions
        .iter()
        .map(|decision| solution.value(*decision))
        .collect())
}

/// Rejects a relaxation that came back without a usable point.
fn finite_point(point: Vec<f64>) -> Result<Vec<f64>, SolverFailure> {
    if point.iter().all(|x| x.is_finite()) {
        Ok(point)
    } else {
        Err(SolverFailure::NotSolved)
    }
}

/// Index of the variable furthest from an integer, or `None` when the point
/// is integral.
fn most_fractional(point: &[f64]) -> Option<usize> {
    let mut pick = None;
    let mut widest = INTEGRALITY_TOLERANCE;
    for (index, x) in point.iter().enumerate() {
        let gap = (x - x.round()).abs();
        if gap > widest {
            widest = gap;
            pick = Some(index);
        }
    }
    pick
}

fn resolution_failure(err: ResolutionError) -> SolverFailure {
    match err {
        ResolutionError::Infeasible => SolverFailure::Infeasible,
        ResolutionError::Unbounded => SolverFailure::Unbounded,
        other => SolverFailure::Abnormal {
            detail: other.to_string(),
        },
    }
}

/// Backend that never solves; forces the heuristic path.
#[derive(Debug, Clone, Default)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    /// Creates the backend with the reason reported on every call.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl IntegerBackend for UnavailableBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn solve(
        &self,
        _program: &CoverProgram,
        _deadline: &Deadline,
    ) -> Result<Vec<bool>, SolverFailure> {
        Err(SolverFailure::Unavailable {
            detail: if self.reason.is_empty() {
                "no integer backend configured".to_string()
            } else {
                self.reason.clone()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_points_have_no_branching_variable() {
        assert_eq!(most_fractional(&[0.0, 1.0, 1.0 - 1e-9]), None);
        assert_eq!(most_fractional(&[0.0, 0.3, 0.5]), Some(2));
    }

    #[test]
    fn resolution_errors_map_to_failures() {
        assert_eq!(
            resolution_failure(ResolutionError::Infeasible),
            SolverFailure::Infeasible
        );
        assert!(matches!(
            resolution_failure(ResolutionError::Other("numerical trouble")),
            SolverFailure::Abnormal { .. }
        ));
    }

    #[test]
    fn non_finite_relaxation_is_not_solved() {
        assert_eq!(finite_point(vec![0.0, 1.0]), Ok(vec![0.0, 1.0]));
        assert_eq!(
            finite_point(vec![0.5, f64::NAN]),
            Err(SolverFailure::NotSolved)
        );
    }

    #[test]
    fn cancelled_deadline_is_expired() {
        let deadline = Deadline::after(Duration::from_secs(60));
        let held = deadline.clone();
        assert!(!held.expired());
        deadline.cancel();
        assert!(held.expired());
        assert_eq!(held.timed_out(), SolverFailure::TimedOut { budget_ms: 60_000 });
    }
}
