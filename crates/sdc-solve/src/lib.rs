#![deny(missing_docs)]
#![doc = "Secondary suppression over a constraint graph."]

//! The protection requirement of every constraint is turned into a set
//! covering program with one binary variable per non-primary cell. An
//! [`IntegerBackend`] solves it within a time budget; any failure falls back
//! to a deterministic greedy cover.

pub mod adequacy;
/// Integer programming backends and the cancellation deadline they poll.
pub mod backend;
/// Solver settings read from the run configuration.
pub mod config;
/// Non-fatal optimizer failures.
pub mod failure;
/// Greedy fallback cover.
pub mod heuristic;
/// Set covering program built from a constraint graph.
pub mod program;
/// Time-bounded optimizer with heuristic fallback.
pub mod solver;

pub use adequacy::required_secondary;
pub use backend::{Deadline, IntegerBackend, MicroLpBackend, UnavailableBackend};
pub use config::{BackendKind, SolveMode, SolverConfig};
pub use failure::SolverFailure;
pub use heuristic::heuristic_cover;
pub use program::{CoverProgram, CoverRow};
pub use solver::{SecondaryOutcome, SecondarySuppressionSolver, SolveStrategy};
