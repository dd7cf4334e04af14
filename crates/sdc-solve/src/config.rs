use sdc_core::errors::{ErrorInfo, SdcError};
use serde::{Deserialize, Serialize};

/// Integer programming backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Pure Rust branch and bound via `good_lp`.
    Microlp,
    /// No backend; every run falls back to the heuristic.
    None,
}

/// How the secondary set is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMode {
    /// Optimizer first, heuristic on failure.
    Optimizer,
    /// Heuristic only.
    Heuristic,
}

/// YAML-configurable secondary suppression settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Backend used in optimizer mode.
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    /// Wall clock budget for the optimizer in milliseconds.
    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,
    /// Selection mode.
    #[serde(default = "default_mode")]
    pub mode: SolveMode,
}

fn default_backend() -> BackendKind {
    BackendKind::Microlp
}

fn default_time_budget_ms() -> u64 {
    10_000
}

fn default_mode() -> SolveMode {
    SolveMode::Optimizer
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            time_budget_ms: default_time_budget_ms(),
            mode: default_mode(),
        }
    }
}

impl SolverConfig {
    /// Rejects a zero time budget.
    pub fn validate(&self) -> Result<(), SdcError> {
        if self.time_budget_ms == 0 {
            return Err(SdcError::Configuration(
                ErrorInfo::new("time-budget-zero", "time_budget_ms must be positive")
                    .with_hint("use mode: heuristic to skip the optimizer"),
            ));
        }
        Ok(())
    }
}
